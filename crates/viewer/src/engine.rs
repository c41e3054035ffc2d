//! The narrow seam over the external point-cloud rendering engine.
//!
//! The engine is a host-controlled capability, never reimplemented here:
//! loading data by URL, scene-graph add/remove of simple mesh objects,
//! camera/ray intersection against loaded points, and bounding-box queries
//! all belong to it. The shell only needs these five operations.

use async_trait::async_trait;
use cloudmark_core::Position;

/// A pointer location in canvas-local pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

/// Errors surfaced by the rendering engine adapter.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The point cloud at the given URL could not be loaded.
    #[error("Failed to load point cloud: {0}")]
    LoadFailed(String),
}

/// Adapter trait over the external rendering engine.
///
/// `Scene` is the handle to loaded point-cloud data; `Marker` is the handle
/// to one rendered marker mesh.
#[async_trait]
pub trait PointCloudEngine {
    type Scene;
    type Marker;

    /// Load point-cloud data by URL, resolving once the engine's completion
    /// callback fires.
    async fn load_scene(&mut self, url: &str) -> Result<Self::Scene, EngineError>;

    /// Ray/scene intersection test for a pointer position. `None` is a miss.
    fn pick(&self, pointer: ScreenPoint) -> Option<Position>;

    /// Add a marker mesh of the given radius at a world-space position.
    fn add_marker(&mut self, position: Position, radius: f64) -> Self::Marker;

    /// Remove a marker from the scene and dispose its geometry/material.
    ///
    /// Implementations must free GPU resources here; the engine does not
    /// garbage-collect them.
    fn remove_marker(&mut self, marker: Self::Marker);

    /// Diagonal length of the loaded data's bounding box, if computable.
    fn bounding_diagonal(&self, scene: &Self::Scene) -> Option<f64>;
}
