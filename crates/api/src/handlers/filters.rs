//! Handlers for the `/filters` resource: the session's per-column selections.

use axum::extract::Path;
use axum::Json;
use roster_core::error::CoreError;
use roster_core::filter::FilterState;
use roster_core::partner::PartnerField;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthSession;
use crate::response::DataResponse;

/// Request body for `PUT /filters/{column}`.
#[derive(Debug, Deserialize)]
pub struct SetFilterRequest {
    pub values: Vec<String>,
}

/// Resolve a column path segment given as field key, header label or
/// physical column name.
fn resolve_column(column: &str) -> AppResult<PartnerField> {
    PartnerField::from_name(column).ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "Column",
            key: column.to_string(),
        })
    })
}

/// GET /api/v1/filters
pub async fn get_filters(auth: AuthSession) -> Json<DataResponse<FilterState>> {
    let ctx = auth.context.lock().await;
    Json(DataResponse {
        data: ctx.filters.clone(),
    })
}

/// PUT /api/v1/filters/{column}
///
/// Replace the selection of one column. An empty list unconstrains it.
pub async fn set_filter(
    auth: AuthSession,
    Path(column): Path<String>,
    Json(input): Json<SetFilterRequest>,
) -> AppResult<Json<DataResponse<FilterState>>> {
    let field = resolve_column(&column)?;
    let mut ctx = auth.context.lock().await;
    ctx.filters.set(field, &input.values)?;
    tracing::debug!(username = %auth.username, %field, values = input.values.len(), "Filter set");
    Ok(Json(DataResponse {
        data: ctx.filters.clone(),
    }))
}

/// DELETE /api/v1/filters/{column}
pub async fn clear_filter(
    auth: AuthSession,
    Path(column): Path<String>,
) -> AppResult<Json<DataResponse<FilterState>>> {
    let field = resolve_column(&column)?;
    let mut ctx = auth.context.lock().await;
    ctx.filters.clear(field);
    Ok(Json(DataResponse {
        data: ctx.filters.clone(),
    }))
}

/// DELETE /api/v1/filters
pub async fn clear_all_filters(auth: AuthSession) -> Json<DataResponse<FilterState>> {
    let mut ctx = auth.context.lock().await;
    ctx.filters.clear_all();
    tracing::debug!(username = %auth.username, "Filters cleared");
    Json(DataResponse {
        data: ctx.filters.clone(),
    })
}
