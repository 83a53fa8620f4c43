//! Handlers for bulk spreadsheet import.
//!
//! An upload is parsed and staged in the session as a pending import, and
//! the preview is returned. Nothing reaches the store until the user
//! confirms; cancelling simply drops the staged batch.

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use roster_core::error::CoreError;
use roster_core::importer::{ImportPreview, PendingImport};
use roster_core::spreadsheet::{
    import_template, read_first_sheet, TEMPLATE_FILE_NAME, XLSX_CONTENT_TYPE,
};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthSession;
use crate::response::DataResponse;
use crate::state::AppState;

/// Multipart field carrying the spreadsheet.
const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct ImportResult {
    pub inserted: u64,
    pub source_name: String,
}

/// An oversized upload is a 413; any other malformed multipart body a 400.
fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::BadRequest(err.body_text())
    }
}

fn nothing_pending() -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Pending import",
        key: "current session".into(),
    })
}

// ── Upload ───────────────────────────────────────────────────────────

/// POST /api/v1/import
///
/// Accept a multipart `.xlsx`/`.xls` upload in the `file` field, stage its
/// rows and return the preview. A previously staged batch is replaced.
pub async fn upload(
    auth: AuthSession,
    mut multipart: Multipart,
) -> AppResult<Json<DataResponse<ImportPreview>>> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload.xlsx").to_string();
        let data = field.bytes().await.map_err(multipart_error)?;
        upload = Some((file_name, data));
        break;
    }

    let (file_name, data) = upload.ok_or_else(|| {
        AppError::BadRequest(format!("Multipart field '{FILE_FIELD}' is required"))
    })?;
    if data.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".into()));
    }

    let size = data.len();
    let table = tokio::task::spawn_blocking(move || read_first_sheet(data.to_vec()))
        .await
        .map_err(|e| AppError::InternalError(format!("Spreadsheet reader failed: {e}")))??;

    let mut ctx = auth.context.lock().await;
    let pending = PendingImport::stage(file_name, &table, Utc::now());
    if pending.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "The spreadsheet has no data rows".into(),
        )));
    }

    let preview = pending.preview();
    tracing::info!(
        username = %ctx.username,
        source = %pending.source_name,
        bytes = size,
        rows = pending.records.len(),
        warnings = pending.warnings.len(),
        ignored = pending.ignored_headers.len(),
        "Import staged"
    );
    ctx.pending_import = Some(pending);

    Ok(Json(DataResponse { data: preview }))
}

// ── Preview ──────────────────────────────────────────────────────────

/// GET /api/v1/import
pub async fn get_preview(auth: AuthSession) -> AppResult<Json<DataResponse<ImportPreview>>> {
    let ctx = auth.context.lock().await;
    let pending = ctx.pending_import.as_ref().ok_or_else(nothing_pending)?;
    Ok(Json(DataResponse {
        data: pending.preview(),
    }))
}

// ── Confirm ──────────────────────────────────────────────────────────

/// POST /api/v1/import/confirm
///
/// Write the staged batch in one all-or-nothing call. On failure the batch
/// stays staged so the user can retry.
pub async fn confirm(
    State(state): State<AppState>,
    auth: AuthSession,
) -> AppResult<Json<DataResponse<ImportResult>>> {
    let mut ctx = auth.context.lock().await;
    let pending = ctx.pending_import.as_ref().ok_or_else(|| {
        AppError::Core(CoreError::Conflict(
            "There is no staged import to confirm".into(),
        ))
    })?;

    let inserted = state.store.insert_batch(&pending.records).await?;
    let source_name = pending.source_name.clone();

    ctx.pending_import = None;
    ctx.invalidate();
    tracing::info!(username = %ctx.username, source = %source_name, inserted, "Import confirmed");

    Ok(Json(DataResponse {
        data: ImportResult {
            inserted,
            source_name,
        },
    }))
}

// ── Cancel ───────────────────────────────────────────────────────────

/// DELETE /api/v1/import
pub async fn cancel(auth: AuthSession) -> AppResult<StatusCode> {
    let mut ctx = auth.context.lock().await;
    let pending = ctx.pending_import.take().ok_or_else(nothing_pending)?;
    tracing::info!(
        username = %ctx.username,
        source = %pending.source_name,
        rows = pending.records.len(),
        "Import cancelled"
    );
    Ok(StatusCode::NO_CONTENT)
}

// ── Template ─────────────────────────────────────────────────────────

/// GET /api/v1/import/template
///
/// A workbook holding only the header row, ready to be filled in.
pub async fn template(_auth: AuthSession) -> AppResult<impl IntoResponse> {
    let bytes = import_template()?;
    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{TEMPLATE_FILE_NAME}\""),
            ),
        ],
        bytes,
    ))
}
