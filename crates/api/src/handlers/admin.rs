//! Handlers for the admin export surface.
//!
//! All handlers require the shared admin secret via [`AdminToken`].
//! Serialization stops at JSON here; any CSV or spreadsheet shaping is a
//! downstream concern.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

use crate::error::AppResult;
use crate::middleware::admin::AdminToken;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /admin/export/raw
///
/// Every stored annotation record, stably ordered by annotator then image.
pub async fn export_raw(
    _admin: AdminToken,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let records = state.engine.export_raw().await?;
    Ok(Json(DataResponse { data: records }))
}

/// GET /admin/export/consensus
///
/// The consensus record for every image in inventory order, including
/// images nobody has annotated yet (count 0).
pub async fn export_consensus(
    _admin: AdminToken,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let records = state.engine.consensus_all().await?;
    Ok(Json(DataResponse { data: records }))
}

/// GET /admin/consensus/{image_id}
///
/// The consensus record for one image.
pub async fn consensus_image(
    _admin: AdminToken,
    State(state): State<AppState>,
    Path(image_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let record = state.engine.consensus(&image_id).await?;
    Ok(Json(DataResponse { data: record }))
}
