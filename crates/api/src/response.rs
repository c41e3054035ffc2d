//! Shared response envelope types for API handlers.
//!
//! Use these instead of ad-hoc `serde_json::json!` bodies to get
//! compile-time type safety and consistent serialization.

use serde::Serialize;

/// Standard `{ "items": [...] }` envelope for list responses.
#[derive(Debug, Serialize)]
pub struct ItemsResponse<T: Serialize> {
    pub items: Vec<T>,
}

/// `{ "removed": bool }` body returned by delete operations.
///
/// Deletes are idempotent-style: an unknown id yields `removed: false`
/// with a 200 status, never an error.
#[derive(Debug, Serialize)]
pub struct RemovedResponse {
    pub removed: bool,
}
