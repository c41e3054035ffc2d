//! Marker bookkeeping: the id -> rendered-marker map and sizing rules.
//!
//! The map is scoped to one viewer session. Its key set must stay a subset
//! of the displayed annotation id set, with at most one marker per id;
//! callers guard insertion with [`MarkerSync::contains`] before creating an
//! engine marker so no handle is ever orphaned.

use std::collections::HashMap;

use cloudmark_core::Position;

/// Marker radius as a fraction of the point cloud's bounding diagonal.
pub const RADIUS_DIAGONAL_FACTOR: f64 = 0.001;

/// Radius floor so markers stay visible at small scene scales.
pub const MIN_MARKER_RADIUS: f64 = 0.02;

/// Fallback radius when the bounding diagonal is unavailable.
pub const DEFAULT_MARKER_RADIUS: f64 = 0.03;

/// Vertical offset applied to a marker, as a fraction of its radius, to
/// avoid z-fighting with the surface.
pub const OFFSET_RADIUS_FACTOR: f64 = 0.25;

/// Compute the marker radius for a scene.
///
/// A failed bounding-box computation never fails the operation; it falls
/// back to [`DEFAULT_MARKER_RADIUS`].
pub fn marker_radius(bounding_diagonal: Option<f64>) -> f64 {
    match bounding_diagonal {
        Some(diagonal) => (diagonal * RADIUS_DIAGONAL_FACTOR).max(MIN_MARKER_RADIUS),
        None => DEFAULT_MARKER_RADIUS,
    }
}

/// Where to place a marker for an annotation at `position`: the annotation
/// coordinate, nudged up along z by a quarter radius.
pub fn marker_position(position: Position, radius: f64) -> Position {
    Position {
        z: position.z + radius * OFFSET_RADIUS_FACTOR,
        ..position
    }
}

/// Ownership map from annotation id to the engine's marker handle.
#[derive(Debug)]
pub struct MarkerSync<M> {
    markers: HashMap<String, M>,
}

impl<M> Default for MarkerSync<M> {
    fn default() -> Self {
        Self {
            markers: HashMap::new(),
        }
    }
}

impl<M> MarkerSync<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a marker already exists for this annotation id.
    pub fn contains(&self, id: &str) -> bool {
        self.markers.contains_key(id)
    }

    /// Take ownership of a marker handle for an id.
    ///
    /// Returns `false` and keeps the existing handle if a marker is already
    /// tracked for the id; callers should check [`contains`](Self::contains)
    /// first to avoid creating the new handle at all.
    pub fn track(&mut self, id: &str, marker: M) -> bool {
        if self.markers.contains_key(id) {
            return false;
        }
        self.markers.insert(id.to_string(), marker);
        true
    }

    /// Release the marker handle for an id so the caller can dispose it.
    pub fn untrack(&mut self, id: &str) -> Option<M> {
        self.markers.remove(id)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Annotation ids that currently have a marker.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.markers.keys().map(String::as_str)
    }
}
