//! Handlers for the session-immutable catalog: schema and image inventory.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /schema
///
/// The current question schema, in declaration order.
pub async fn get_schema(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    Ok(Json(DataResponse {
        data: state.engine.schema().clone(),
    }))
}

/// GET /images
///
/// The full ordered image inventory.
pub async fn list_images(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let images: Vec<String> = state.engine.images().iter().map(str::to_string).collect();
    Ok(Json(DataResponse { data: images }))
}

/// GET /images/remaining/{annotator_id}
///
/// Images the annotator has not yet validly completed, in inventory order.
pub async fn remaining_images(
    State(state): State<AppState>,
    Path(annotator_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let remaining = state.engine.remaining(&annotator_id).await?;
    Ok(Json(DataResponse { data: remaining }))
}
