//! Handlers for the `/partners` resource: the filtered roster, manual entry
//! and filter candidate values.

use std::collections::BTreeMap;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use roster_core::filter::{candidate_options, filter, FilterState};
use roster_core::partner::{PartnerField, PartnerRecord, RawPartnerFields};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::auth::AuthSession;
use crate::response::DataResponse;
use crate::session::SessionContext;
use crate::state::AppState;

/// The roster as seen through the session's filters.
#[derive(Debug, Serialize)]
pub struct PartnerListing {
    /// Size of the unfiltered collection.
    pub total: usize,
    /// Number of rows that passed the filters.
    pub matched: usize,
    pub filters: FilterState,
    pub rows: Vec<PartnerRecord>,
}

/// Which collection candidate values are drawn from.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OptionsScope {
    /// Every stored record.
    #[default]
    All,
    /// Only the rows that pass the current filters.
    Filtered,
}

#[derive(Debug, Default, Deserialize)]
pub struct OptionsParams {
    #[serde(default)]
    pub scope: OptionsScope,
}

#[derive(Debug, Serialize)]
pub struct RefreshResult {
    pub total: usize,
}

/// GET /api/v1/partners
pub async fn list_partners(
    State(state): State<AppState>,
    auth: AuthSession,
) -> AppResult<Json<DataResponse<PartnerListing>>> {
    let mut ctx = auth.context.lock().await;
    let records = ctx.records(state.store.as_ref()).await?;

    let rows: Vec<PartnerRecord> = filter(&records, &ctx.filters)
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(DataResponse {
        data: PartnerListing {
            total: records.len(),
            matched: rows.len(),
            filters: ctx.filters.clone(),
            rows,
        },
    }))
}

/// POST /api/v1/partners
///
/// Save one record from a raw field map. Closed-vocabulary fields are checked
/// strictly; a blank `created_by_user` becomes the caller.
pub async fn create_partner(
    State(state): State<AppState>,
    auth: AuthSession,
    Json(input): Json<RawPartnerFields>,
) -> AppResult<(StatusCode, Json<DataResponse<PartnerRecord>>)> {
    let mut ctx = auth.context.lock().await;
    let record = save_record(&state, &mut ctx, input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: record })))
}

/// GET /api/v1/partners/options?scope=all|filtered
///
/// Sorted distinct values per filterable column.
pub async fn list_options(
    State(state): State<AppState>,
    auth: AuthSession,
    Query(params): Query<OptionsParams>,
) -> AppResult<Json<DataResponse<BTreeMap<PartnerField, Vec<String>>>>> {
    let mut ctx = auth.context.lock().await;
    let records = ctx.records(state.store.as_ref()).await?;

    let options = match params.scope {
        OptionsScope::All => candidate_options(&records),
        OptionsScope::Filtered => {
            let visible: Vec<PartnerRecord> = filter(&records, &ctx.filters)
                .into_iter()
                .cloned()
                .collect();
            candidate_options(&visible)
        }
    };

    Ok(Json(DataResponse { data: options }))
}

/// POST /api/v1/partners/refresh
///
/// Drop the session's cached roster and reload it from the store.
pub async fn refresh(
    State(state): State<AppState>,
    auth: AuthSession,
) -> AppResult<Json<DataResponse<RefreshResult>>> {
    let mut ctx = auth.context.lock().await;
    ctx.invalidate();
    let records = ctx.records(state.store.as_ref()).await?;
    Ok(Json(DataResponse {
        data: RefreshResult {
            total: records.len(),
        },
    }))
}

/// Validate, attribute and persist one manually entered record, then drop the
/// session cache so the next read sees it.
pub(crate) async fn save_record(
    state: &AppState,
    ctx: &mut SessionContext,
    input: RawPartnerFields,
) -> AppResult<PartnerRecord> {
    let record = input.into_record().with_default_user(&ctx.username);
    record.validate()?;

    state.store.insert(&record).await?;
    ctx.invalidate();

    tracing::info!(
        username = %ctx.username,
        plate = %record.plate,
        "Partner record saved"
    );
    Ok(record)
}
