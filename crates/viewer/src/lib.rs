//! Viewer-side annotation logic: marker bookkeeping and the session shell.
//!
//! The point-cloud rendering engine itself (scene graph, camera,
//! ray-picking) is an external collaborator. This crate only talks to it
//! through the narrow [`PointCloudEngine`] seam, and to the backend through
//! the [`AnnotationApi`] seam, so both can be mocked in tests and swapped
//! per host environment.

pub mod api;
pub mod engine;
pub mod markers;
pub mod shell;

pub use api::AnnotationApi;
pub use engine::{EngineError, PointCloudEngine, ScreenPoint};
pub use markers::MarkerSync;
pub use shell::{
    FormattedAnnotation, StartReport, ViewerError, ViewerLifecycle, ViewerShell, ViewerState,
};
