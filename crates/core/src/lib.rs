//! Domain types and the in-memory annotation store.
//!
//! This crate is HTTP-free: the API server, the client, and the viewer all
//! build on the types here without pulling in any transport concerns.

pub mod annotation;
pub mod error;
pub mod store;

pub use annotation::{Annotation, CreateAnnotation, Position, MAX_TEXT_BYTES};
pub use error::CoreError;
pub use store::AnnotationStore;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
