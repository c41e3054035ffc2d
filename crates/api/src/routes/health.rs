use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Liveness flag. The store is in-process memory, so a responding
    /// server is a healthy server.
    pub ok: bool,
}

/// GET /health -- returns service liveness.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

/// Mount health check routes.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
