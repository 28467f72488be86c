pub mod admin;
pub mod annotation;
pub mod catalog;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /schema                                   current question schema
/// /images                                   full ordered image inventory
/// /images/remaining/{annotator_id}          images left for one annotator
///
/// /annotations                              submit (POST)
/// /annotations/{annotator_id}/{image_id}    stored answers (GET)
/// /annotators/{annotator_id}/progress       completed set + next image
/// /annotators/{annotator_id}/annotated      completed image ids
///
/// /admin/export/raw                         all records (admin token)
/// /admin/export/consensus                   consensus for every image
/// /admin/consensus/{image_id}               consensus for one image
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(catalog::router())
        .merge(annotation::router())
        .merge(admin::router())
}
