//! Handlers for the annotation CRUD surface.
//!
//! Each handler is a thin pass-through to the [`AnnotationStore`] with
//! status-code mapping; all payload validation happens in `cloudmark-core`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::Value;

use cloudmark_core::{Annotation, CreateAnnotation};

use crate::error::AppResult;
use crate::response::{ItemsResponse, RemovedResponse};
use crate::state::AppState;

/// GET /annotations
///
/// List all annotations, newest-first.
pub async fn list_annotations(State(state): State<AppState>) -> Json<ItemsResponse<Annotation>> {
    Json(ItemsResponse {
        items: state.store.list(),
    })
}

/// POST /annotations
///
/// Create a new annotation from a `{ position, text }` body.
///
/// The body is taken as a raw JSON value so that a missing `position` or a
/// non-string `text` maps to the contract's 400 `Invalid payload` response
/// rather than the extractor's deserialization rejection.
pub async fn create_annotation(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> AppResult<impl IntoResponse> {
    let input = CreateAnnotation::from_value(&body)?;

    let annotation = state.store.create(input);

    tracing::info!(
        id = %annotation.id,
        text_bytes = annotation.text.len(),
        "Annotation created"
    );

    Ok((StatusCode::CREATED, Json(annotation)))
}

/// DELETE /annotations/{id}
///
/// Remove an annotation by id. A missing id is not an error: the response
/// is still 200 with `removed: false`.
pub async fn delete_annotation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<RemovedResponse> {
    let removed = state.store.delete(&id);

    if removed {
        tracing::info!(%id, "Annotation deleted");
    } else {
        tracing::debug!(%id, "Delete for unknown annotation id");
    }

    Json(RemovedResponse { removed })
}
