use axum::routing::{get, put};
use axum::Router;

use crate::handlers::filters;
use crate::state::AppState;

/// Routes mounted at `/filters`.
///
/// ```text
/// GET    /           -> get_filters
/// DELETE /           -> clear_all_filters
/// PUT    /{column}   -> set_filter
/// DELETE /{column}   -> clear_filter
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(filters::get_filters).delete(filters::clear_all_filters),
        )
        .route(
            "/{column}",
            put(filters::set_filter).delete(filters::clear_filter),
        )
}
