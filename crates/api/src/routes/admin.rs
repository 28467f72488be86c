//! Route definitions for the admin export surface.

use axum::routing::get;
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/export/raw", get(admin::export_raw))
        .route("/admin/export/consensus", get(admin::export_consensus))
        .route("/admin/consensus/{image_id}", get(admin::consensus_image))
}
