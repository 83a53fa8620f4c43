use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use roster_api::config::{ServerConfig, StoreConfig};
use roster_api::router::build_app_router;
use roster_api::session::SessionStore;
use roster_api::state::AppState;
use roster_db::{
    CredentialStore, MySqlCredentialStore, MySqlPartnerStore, PartnerStore,
    StaticCredentialStore, WorkbookPartnerStore,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roster_api=debug,roster_db=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        backend = config.store.backend_name(),
        "Loaded server configuration"
    );

    // --- Stores ---
    let (store, credentials) = build_stores(&config.store).await;

    let sessions = Arc::new(SessionStore::new(Duration::from_secs(
        config.session_idle_mins * 60,
    )));

    let state = AppState {
        store,
        credentials,
        sessions,
        config: Arc::new(config.clone()),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Connect the configured backend. The relational backend is migrated and
/// health-checked before the server accepts requests.
async fn build_stores(
    config: &StoreConfig,
) -> (Arc<dyn PartnerStore>, Arc<dyn CredentialStore>) {
    match config {
        StoreConfig::MySql {
            database_url,
            max_connections,
        } => {
            let pool = roster_db::create_pool(database_url, *max_connections)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            roster_db::health_check(&pool)
                .await
                .expect("Database health check failed");
            tracing::info!("Database health check passed");

            roster_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            let store: Arc<dyn PartnerStore> = Arc::new(MySqlPartnerStore::new(pool.clone()));
            let credentials: Arc<dyn CredentialStore> =
                Arc::new(MySqlCredentialStore::new(pool));
            (store, credentials)
        }
        StoreConfig::Workbook { path, sheet, users } => {
            let credentials = StaticCredentialStore::parse(users)
                .unwrap_or_else(|e| panic!("ROSTER_USERS is invalid: {e}"));
            if credentials.is_empty() {
                tracing::warn!("ROSTER_USERS is empty; nobody will be able to log in");
            }
            tracing::info!(
                path = %path.display(),
                sheet = %sheet,
                users = credentials.len(),
                "Using partner workbook"
            );
            let store: Arc<dyn PartnerStore> =
                Arc::new(WorkbookPartnerStore::new(path.clone(), sheet.clone()));
            let credentials: Arc<dyn CredentialStore> = Arc::new(credentials);
            (store, credentials)
        }
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
