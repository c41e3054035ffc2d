use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cloudmark_core::CoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] and implements [`IntoResponse`] to produce the
/// `{ "error": message }` JSON bodies the API contract uses. There is no
/// structured error code beyond the HTTP status.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `cloudmark-core`.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Core(core) => match core {
                CoreError::InvalidPayload => {
                    (StatusCode::BAD_REQUEST, core.to_string())
                }
                CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            },
        };

        let body = json!({ "error": message });

        (status, axum::Json(body)).into_response()
    }
}
