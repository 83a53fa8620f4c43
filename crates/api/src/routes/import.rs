//! Route definitions for bulk spreadsheet import.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::import;
use crate::state::AppState;

/// Routes mounted at `/import`.
///
/// ```text
/// POST   /           -> upload (multipart, at most `max_upload_bytes`)
/// GET    /           -> get_preview
/// DELETE /           -> cancel
/// POST   /confirm    -> confirm
/// GET    /template   -> template
/// ```
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(import::upload)
                .layer(DefaultBodyLimit::max(max_upload_bytes))
                .get(import::get_preview)
                .delete(import::cancel),
        )
        .route("/confirm", post(import::confirm))
        .route("/template", get(import::template))
}
