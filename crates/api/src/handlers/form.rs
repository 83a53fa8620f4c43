//! Handlers for the `/form` resource: the manual-entry draft kept in the
//! session between requests.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use roster_core::partner::{PartnerForm, PartnerRecord};

use crate::error::AppResult;
use crate::handlers::partners::save_record;
use crate::middleware::auth::AuthSession;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/form
pub async fn get_form(auth: AuthSession) -> Json<DataResponse<PartnerForm>> {
    let ctx = auth.context.lock().await;
    Json(DataResponse {
        data: ctx.form.clone(),
    })
}

/// PUT /api/v1/form
///
/// Replace the draft. Omitted fields take their initial values.
pub async fn put_form(
    auth: AuthSession,
    Json(form): Json<PartnerForm>,
) -> Json<DataResponse<PartnerForm>> {
    let mut ctx = auth.context.lock().await;
    ctx.form = form;
    Json(DataResponse {
        data: ctx.form.clone(),
    })
}

/// DELETE /api/v1/form
pub async fn reset_form(auth: AuthSession) -> Json<DataResponse<PartnerForm>> {
    let mut ctx = auth.context.lock().await;
    ctx.form.reset();
    Json(DataResponse {
        data: ctx.form.clone(),
    })
}

/// POST /api/v1/form/submit
///
/// Save the draft as a record. The draft is reset only when the save
/// succeeds, so a rejected submission can be corrected and resent.
pub async fn submit_form(
    State(state): State<AppState>,
    auth: AuthSession,
) -> AppResult<(StatusCode, Json<DataResponse<PartnerRecord>>)> {
    let mut ctx = auth.context.lock().await;
    let raw = ctx.form.to_raw();
    let record = save_record(&state, &mut ctx, raw).await?;
    ctx.form.reset();
    Ok((StatusCode::CREATED, Json(DataResponse { data: record })))
}
