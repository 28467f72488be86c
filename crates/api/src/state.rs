use std::sync::Arc;

use els_core::AnnotationEngine;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything lives behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The annotation engine (schema, image inventory, progress store).
    pub engine: Arc<AnnotationEngine>,
    /// Server configuration (admin token, timeouts).
    pub config: Arc<ServerConfig>,
}
