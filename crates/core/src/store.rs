//! The authoritative in-memory annotation store.
//!
//! Records live newest-first in a single `Vec` behind an `RwLock`. The lock
//! is required because axum handlers run on a multi-threaded runtime; every
//! read-modify-write sequence happens under one guard. There is no
//! persistence: a process restart discards all annotations.

use std::sync::{PoisonError, RwLock};

use chrono::Utc;
use uuid::Uuid;

use crate::annotation::{Annotation, CreateAnnotation};

/// In-memory, insertion-ordered (newest-first) annotation collection.
///
/// Duplicate text/position pairs are permitted; there is no size bound,
/// eviction, or pagination. Unknown ids on delete are not an error.
#[derive(Debug, Default)]
pub struct AnnotationStore {
    items: RwLock<Vec<Annotation>>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all annotations, newest-first. No side effects.
    pub fn list(&self) -> Vec<Annotation> {
        self.read().clone()
    }

    /// Store a new annotation with a fresh id and the current timestamp,
    /// prepending it to the sequence, and return the stored record.
    pub fn create(&self, input: CreateAnnotation) -> Annotation {
        let annotation = Annotation {
            id: Uuid::new_v4().to_string(),
            text: input.text,
            position: input.position,
            created_at: Utc::now(),
        };

        self.write().insert(0, annotation.clone());
        annotation
    }

    /// Remove the annotation with the given id, if present.
    ///
    /// Returns whether a removal occurred; a missing id is not an error.
    pub fn delete(&self, id: &str) -> bool {
        let mut items = self.write();
        let before = items.len();
        items.retain(|a| a.id != id);
        items.len() != before
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // A poisoned lock means a panic elsewhere while holding the guard; the
    // data itself is still coherent (single insert/retain operations), so
    // recover the guard instead of propagating the panic.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<Annotation>> {
        self.items.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Annotation>> {
        self.items.write().unwrap_or_else(PoisonError::into_inner)
    }
}
