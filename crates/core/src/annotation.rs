//! Annotation domain types and payload validation.
//!
//! An annotation is a short text note pinned to a world-space coordinate in
//! a point cloud. The wire shape is camelCase JSON:
//!
//! ```json
//! { "id": "...", "text": "...", "position": {"x": 1.0, "y": 2.0, "z": 3.0},
//!   "createdAt": "2026-01-01T00:00:00Z" }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;
use crate::Timestamp;

/// Maximum annotation text length in UTF-8 bytes.
///
/// Enforced both in the viewer (before any network call) and server-side on
/// create.
pub const MAX_TEXT_BYTES: usize = 256;

/// A world-space coordinate in the point cloud's frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// A stored annotation record.
///
/// `id` and `created_at` are assigned by the store at creation and never
/// mutated. There is no update operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub id: String,
    pub text: String,
    pub position: Position,
    pub created_at: Timestamp,
}

/// Validated input for creating an annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateAnnotation {
    pub text: String,
    pub position: Position,
}

impl CreateAnnotation {
    /// Parse a raw JSON body into a create request.
    ///
    /// Mirrors the minimal payload check the API contract specifies:
    /// `position` must be present with numeric `x`/`y`/`z`, and `text` must
    /// be a string (empty is accepted). Anything else is
    /// [`CoreError::InvalidPayload`]. Text over [`MAX_TEXT_BYTES`] is
    /// rejected as a validation failure.
    pub fn from_value(body: &Value) -> Result<Self, CoreError> {
        let text = body
            .get("text")
            .and_then(Value::as_str)
            .ok_or(CoreError::InvalidPayload)?;

        let position: Position = body
            .get("position")
            .cloned()
            .map(serde_json::from_value)
            .and_then(Result::ok)
            .ok_or(CoreError::InvalidPayload)?;

        validate_text(text)?;

        Ok(Self {
            text: text.to_string(),
            position,
        })
    }
}

/// Check the text-length limit in UTF-8 bytes.
pub fn validate_text(text: &str) -> Result<(), CoreError> {
    if text.len() > MAX_TEXT_BYTES {
        return Err(CoreError::Validation(format!(
            "Text too long: {} bytes (max {MAX_TEXT_BYTES})",
            text.len()
        )));
    }
    Ok(())
}
