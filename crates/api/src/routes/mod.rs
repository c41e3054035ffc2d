pub mod annotation;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the full route tree (mounted at the application root).
///
/// ```text
/// GET    /health              health check
/// GET    /annotations         list annotations (newest-first)
/// POST   /annotations         create annotation
/// DELETE /annotations/{id}    delete annotation by id
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(annotation::router())
}
