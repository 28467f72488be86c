//! Route definitions for annotation submission and progress.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::annotation;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/annotations", post(annotation::submit_annotation))
        .route(
            "/annotations/{annotator_id}/{image_id}",
            get(annotation::get_annotation),
        )
        .route(
            "/annotators/{annotator_id}/progress",
            get(annotation::progress),
        )
        .route(
            "/annotators/{annotator_id}/annotated",
            get(annotation::annotated),
        )
}
