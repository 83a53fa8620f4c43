use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use roster_core::error::CoreError;
use roster_core::spreadsheet::SpreadsheetError;
use roster_db::StoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps the domain, store and spreadsheet errors and renders every one of
/// them as a `{ "error": ..., "code": ... }` JSON body.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A persistence collaborator failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// An uploaded spreadsheet could not be read, or a workbook not written.
    #[error(transparent)]
    Spreadsheet(#[from] SpreadsheetError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, key } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} '{key}' not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
            },

            AppError::Store(err) => classify_store_error(err),

            AppError::Spreadsheet(SpreadsheetError::Write(err)) => {
                tracing::error!(error = %err, "Spreadsheet generation failed");
                internal_error()
            }
            AppError::Spreadsheet(err) => {
                tracing::warn!(error = %err, "Rejected unreadable spreadsheet");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "PARSE_FAILURE",
                    err.to_string(),
                )
            }

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                msg.clone(),
            ),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal_error()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal_error() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Map a store failure onto its HTTP status and error code.
///
/// - unreachable store: 503 `CONNECTION_FAILURE`
/// - rejected write: 500 `WRITE_FAILURE`
/// - locked workbook or undecodable rows: 422 `PARSE_FAILURE`
fn classify_store_error(err: &StoreError) -> (StatusCode, &'static str, String) {
    match err {
        StoreError::Connection(_) => {
            tracing::error!(error = %err, "Partner store unreachable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "CONNECTION_FAILURE",
                err.to_string(),
            )
        }
        StoreError::Write(_) => {
            tracing::error!(error = %err, "Partner store rejected write");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "WRITE_FAILURE",
                err.to_string(),
            )
        }
        StoreError::Parse(_) => {
            tracing::error!(error = %err, "Stored partner data unreadable");
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                "PARSE_FAILURE",
                err.to_string(),
            )
        }
    }
}
