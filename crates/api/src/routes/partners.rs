//! Route definitions for the `/partners` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::partners;
use crate::state::AppState;

/// Routes mounted at `/partners`.
///
/// ```text
/// GET  /          -> list_partners
/// POST /          -> create_partner
/// GET  /options   -> list_options
/// POST /refresh   -> refresh
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(partners::list_partners).post(partners::create_partner),
        )
        .route("/options", get(partners::list_options))
        .route("/refresh", post(partners::refresh))
}
