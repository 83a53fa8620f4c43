use axum::routing::{get, post};
use axum::Router;

use crate::handlers::form;
use crate::state::AppState;

/// Routes mounted at `/form`.
///
/// ```text
/// GET    /         -> get_form
/// PUT    /         -> put_form
/// DELETE /         -> reset_form
/// POST   /submit   -> submit_form
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(form::get_form)
                .put(form::put_form)
                .delete(form::reset_form),
        )
        .route("/submit", post(form::submit_form))
}
