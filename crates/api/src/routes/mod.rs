pub mod auth;
pub mod filters;
pub mod form;
pub mod health;
pub mod import;
pub mod partners;

use axum::Router;

use crate::config::ServerConfig;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                         login
/// /auth/logout                        logout (requires auth)
///
/// /partners                           list filtered (GET), create (POST)
/// /partners/options                   candidate filter values (GET)
/// /partners/refresh                   reload session roster (POST)
///
/// /filters                            get (GET), clear all (DELETE)
/// /filters/{column}                   set (PUT), clear (DELETE)
///
/// /form                               get, replace, reset (GET, PUT, DELETE)
/// /form/submit                        save draft as a record (POST)
///
/// /import                             upload (POST, size-limited), preview (GET), cancel (DELETE)
/// /import/confirm                     commit staged batch (POST)
/// /import/template                    header-only workbook (GET)
/// ```
pub fn api_routes(config: &ServerConfig) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/partners", partners::router())
        .nest("/filters", filters::router())
        .nest("/form", form::router())
        .nest("/import", import::router(config.max_upload_bytes))
}
