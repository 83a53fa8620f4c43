#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use roster_api::auth::jwt::JwtConfig;
use roster_api::auth::password::hash_password;
use roster_api::config::{ServerConfig, StoreConfig};
use roster_api::router::build_app_router;
use roster_api::session::SessionStore;
use roster_api::state::AppState;
use roster_core::spreadsheet::DEFAULT_SHEET_NAME;
use roster_db::{PartnerStore, StaticCredentialStore, WorkbookPartnerStore};

pub const ANA: (&str, &str) = ("ana", "senha-da-ana");
pub const CARLOS: (&str, &str) = ("carlos", "senha-do-carlos");

/// A router wired to a workbook store in a temporary directory.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<dyn PartnerStore>,
    pub workbook_path: PathBuf,
    _dir: TempDir,
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(workbook_path: PathBuf) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        max_upload_bytes: 1024 * 1024,
        session_idle_mins: 60,
        store: StoreConfig::Workbook {
            path: workbook_path,
            sheet: DEFAULT_SHEET_NAME.to_string(),
            users: String::new(),
        },
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

fn test_credentials() -> StaticCredentialStore {
    StaticCredentialStore::new([ANA, CARLOS].map(|(user, password)| {
        (
            user.to_string(),
            hash_password(password).expect("hashing should succeed"),
        )
    }))
}

/// Build the full application router over an empty workbook store.
pub fn build_test_app() -> TestApp {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let workbook_path = dir.path().join("parceiros.xlsx");
    let store: Arc<dyn PartnerStore> = Arc::new(WorkbookPartnerStore::new(
        workbook_path.clone(),
        DEFAULT_SHEET_NAME,
    ));
    let router = build_router_with_store(Arc::clone(&store), workbook_path.clone());
    TestApp {
        router,
        store,
        workbook_path,
        _dir: dir,
    }
}

/// Build the router around an arbitrary partner store.
pub fn build_router_with_store(store: Arc<dyn PartnerStore>, workbook_path: PathBuf) -> Router {
    let config = test_config(workbook_path);
    let state = AppState {
        store,
        credentials: Arc::new(test_credentials()),
        sessions: Arc::new(SessionStore::new(Duration::from_secs(
            config.session_idle_mins * 60,
        ))),
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone()
        .oneshot(request)
        .await
        .expect("router is infallible")
}

fn authed(method: Method, uri: &str, token: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
}

pub async fn get(app: &Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_auth(app: &Router, uri: &str, token: &str) -> Response {
    let request = authed(Method::GET, uri, token).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_auth(app: &Router, uri: &str, token: &str) -> Response {
    let request = authed(Method::POST, uri, token).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn post_json_auth(
    app: &Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    let request = authed(Method::POST, uri, token)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn put_json_auth(
    app: &Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    let request = authed(Method::PUT, uri, token)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn delete_auth(app: &Router, uri: &str, token: &str) -> Response {
    let request = authed(Method::DELETE, uri, token).body(Body::empty()).unwrap();
    send(app, request).await
}

const BOUNDARY: &str = "roster-test-boundary";

/// POST a single file as multipart field `field`.
pub async fn upload_auth(
    app: &Router,
    uri: &str,
    token: &str,
    field: &str,
    file_name: &str,
    bytes: &[u8],
) -> Response {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let request = authed(Method::POST, uri, token)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

/// Log in and return the access token.
pub async fn login(app: &Router, (username, password): (&str, &str)) -> String {
    let body = serde_json::json!({ "username": username, "password": password });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK, "login should succeed");
    let json = body_json(response).await;
    json["data"]["access_token"]
        .as_str()
        .expect("login response must contain access_token")
        .to_string()
}

// ---------------------------------------------------------------------------
// Spreadsheet helpers
// ---------------------------------------------------------------------------

/// An `.xlsx` file whose first sheet holds `rows` as text cells.
pub fn xlsx_bytes(rows: &[&[&str]]) -> Vec<u8> {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            sheet
                .write_string(r as u32, c as u16, *value)
                .expect("cell should be written");
        }
    }
    workbook.save_to_buffer().expect("workbook should serialize")
}
