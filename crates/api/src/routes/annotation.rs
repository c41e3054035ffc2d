//! Route definitions for point-cloud annotations.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::annotation;
use crate::state::AppState;

/// Annotation routes, mounted at the application root.
///
/// ```text
/// GET    /annotations         list_annotations
/// POST   /annotations         create_annotation
/// DELETE /annotations/{id}    delete_annotation
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/annotations",
            get(annotation::list_annotations).post(annotation::create_annotation),
        )
        .route("/annotations/{id}", delete(annotation::delete_annotation))
}
