//! Route definitions for the schema and image catalog.

use axum::routing::get;
use axum::Router;

use crate::handlers::catalog;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/schema", get(catalog::get_schema))
        .route("/images", get(catalog::list_images))
        .route(
            "/images/remaining/{annotator_id}",
            get(catalog::remaining_images),
        )
}
