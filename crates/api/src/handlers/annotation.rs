//! Handlers for annotation submission and per-annotator progress.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/* --------------------------------------------------------------------------
   Request DTOs
   -------------------------------------------------------------------------- */

/// Request body for `POST /annotations`.
#[derive(Debug, Deserialize)]
pub struct SubmitAnnotationRequest {
    pub annotator_id: String,
    pub image_id: String,
    /// Raw answer payload; validated against the schema server-side.
    pub answers: serde_json::Value,
}

/// Optional client-cached position for progress reconciliation.
#[derive(Debug, Deserialize)]
pub struct ProgressParams {
    /// The image the client believes it was working on.
    pub resume_image: Option<String>,
}

/* --------------------------------------------------------------------------
   Handlers
   -------------------------------------------------------------------------- */

/// POST /annotations
///
/// The only write path: validate the submission against the current
/// schema and store it, replacing any earlier submission for the same
/// `(annotator, image)` key.
pub async fn submit_annotation(
    State(state): State<AppState>,
    Json(input): Json<SubmitAnnotationRequest>,
) -> AppResult<impl IntoResponse> {
    let record = state
        .engine
        .validate_and_store(&input.annotator_id, &input.image_id, &input.answers)
        .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: record })))
}

/// GET /annotations/{annotator_id}/{image_id}
///
/// The stored answer set for one key, or 404 if none exists.
pub async fn get_annotation(
    State(state): State<AppState>,
    Path((annotator_id, image_id)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    let answers = state
        .engine
        .get(&annotator_id, &image_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "No annotation by '{annotator_id}' for '{image_id}'"
            ))
        })?;
    Ok(Json(DataResponse { data: answers }))
}

/// GET /annotators/{annotator_id}/progress
///
/// Completion state plus the next image to present. An optional
/// `resume_image` query parameter carries the client's cached position;
/// a stale value falls back silently to the default scan.
pub async fn progress(
    State(state): State<AppState>,
    Path(annotator_id): Path<String>,
    Query(params): Query<ProgressParams>,
) -> AppResult<impl IntoResponse> {
    let progress = state
        .engine
        .progress(&annotator_id, params.resume_image.as_deref())
        .await?;
    Ok(Json(DataResponse { data: progress }))
}

/// GET /annotators/{annotator_id}/annotated
///
/// The set of image ids this annotator has validly completed.
pub async fn annotated(
    State(state): State<AppState>,
    Path(annotator_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let completed = state.engine.annotated(&annotator_id).await?;
    Ok(Json(DataResponse { data: completed }))
}
