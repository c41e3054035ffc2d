use std::sync::Arc;

use cloudmark_core::AnnotationStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// The authoritative in-memory annotation store.
    pub store: Arc<AnnotationStore>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
