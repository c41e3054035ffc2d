//! The viewer session shell: lifecycle, state machine, and the glue between
//! pointer picks, the annotation API, and marker bookkeeping.

use std::sync::atomic::{AtomicBool, Ordering};

use cloudmark_client::ClientError;
use cloudmark_core::{Annotation, Position, Timestamp, MAX_TEXT_BYTES};

use crate::api::AnnotationApi;
use crate::engine::{EngineError, PointCloudEngine, ScreenPoint};
use crate::markers::{marker_position, marker_radius, MarkerSync};

/// Errors surfaced to the host for user-facing display.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    /// An operation that requires a loaded scene arrived too early.
    #[error("Viewer is not ready")]
    NotReady,

    /// `start` was called on a shell that already loaded a scene.
    #[error("Viewer already started")]
    AlreadyStarted,

    /// Annotation text over the byte limit, caught before any network call.
    #[error("Text too long: {len} bytes (max {MAX_TEXT_BYTES})")]
    TextTooLong { len: usize },

    /// The annotation API failed (non-2xx or transport error).
    #[error(transparent)]
    Api(#[from] ClientError),

    /// The rendering engine failed.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Session states. Transitions only move forward:
/// `Uninitialized -> Loading -> Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerState {
    Uninitialized,
    Loading,
    Ready,
}

/// One-time initialization guard for the viewer instance.
///
/// Replaces an ambient module-level flag: the host keeps one of these per
/// process and calls [`initialize`](Self::initialize) on mount; repeated
/// mounts see `false` and skip constructing a second viewer.
#[derive(Debug, Default)]
pub struct ViewerLifecycle {
    initialized: AtomicBool,
}

impl ViewerLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim initialization. Returns `true` exactly once.
    pub fn initialize(&self) -> bool {
        !self.initialized.swap(true, Ordering::SeqCst)
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }
}

/// Outcome of [`ViewerShell::start`].
///
/// The initial annotation fetch fails open: a fetch error leaves the viewer
/// usable and is reported back in `fetch_error` for the host to display.
#[derive(Debug)]
pub struct StartReport {
    /// How many existing annotations were fetched and rendered.
    pub loaded: usize,
    /// Set when the initial fetch failed.
    pub fetch_error: Option<String>,
}

/// An annotation plus its display projection for the overlay list.
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedAnnotation {
    pub id: String,
    pub text: String,
    /// `"x, y, z"` to three decimals.
    pub pos_text: String,
    pub created_at: Timestamp,
}

/// The viewer session: owns the engine adapter, the API handle, the
/// displayed annotation list, and the marker map, keeping the last two in
/// lockstep.
///
/// All mutation happens from the single UI event flow, so the shell needs
/// no internal locking.
pub struct ViewerShell<E: PointCloudEngine, A: AnnotationApi> {
    engine: E,
    api: A,
    state: ViewerState,
    scene: Option<E::Scene>,
    annotations: Vec<Annotation>,
    markers: MarkerSync<E::Marker>,
}

impl<E: PointCloudEngine, A: AnnotationApi> ViewerShell<E, A> {
    pub fn new(engine: E, api: A) -> Self {
        Self {
            engine,
            api,
            state: ViewerState::Uninitialized,
            scene: None,
            annotations: Vec::new(),
            markers: MarkerSync::new(),
        }
    }

    pub fn state(&self) -> ViewerState {
        self.state
    }

    /// Displayed annotations, newest-first.
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Load the point cloud and perform the initial fetch-and-render.
    ///
    /// A scene load failure resets the shell to `Uninitialized` and is
    /// returned as an error. A fetch failure does NOT block the viewer: the
    /// shell still reaches `Ready` with an empty list and the error message
    /// comes back in the report.
    pub async fn start(&mut self, scene_url: &str) -> Result<StartReport, ViewerError> {
        if self.state != ViewerState::Uninitialized {
            return Err(ViewerError::AlreadyStarted);
        }

        self.state = ViewerState::Loading;
        tracing::info!(url = %scene_url, "Loading point cloud");

        let scene = match self.engine.load_scene(scene_url).await {
            Ok(scene) => scene,
            Err(e) => {
                self.state = ViewerState::Uninitialized;
                return Err(e.into());
            }
        };
        self.scene = Some(scene);
        self.state = ViewerState::Ready;

        match self.api.list().await {
            Ok(items) => {
                for annotation in &items {
                    self.add_marker(annotation);
                }
                self.annotations = items;
                tracing::info!(count = self.annotations.len(), "Rendered existing annotations");
                Ok(StartReport {
                    loaded: self.annotations.len(),
                    fetch_error: None,
                })
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load annotations from API");
                Ok(StartReport {
                    loaded: 0,
                    fetch_error: Some(e.to_string()),
                })
            }
        }
    }

    /// Resolve a pointer click to a world-space coordinate.
    ///
    /// Returns `None` before the scene is ready or when the ray misses the
    /// loaded point-cloud data (a miss is a no-op for the caller).
    pub fn pick(&self, pointer: ScreenPoint) -> Option<Position> {
        if self.state != ViewerState::Ready {
            return None;
        }
        self.engine.pick(pointer)
    }

    /// Create an annotation at a picked coordinate.
    ///
    /// Trims the text; empty text after trimming is a local cancel
    /// (`Ok(None)`, nothing sent). Text over the 256-byte limit is rejected
    /// before any network call. On success the marker is added and the
    /// record prepended to the displayed list.
    pub async fn annotate(
        &mut self,
        position: Position,
        text: &str,
    ) -> Result<Option<&Annotation>, ViewerError> {
        self.ensure_ready()?;

        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        if text.len() > MAX_TEXT_BYTES {
            return Err(ViewerError::TextTooLong { len: text.len() });
        }

        let created = self.api.create(&position, text).await?;

        self.add_marker(&created);
        self.annotations.insert(0, created);
        Ok(Some(&self.annotations[0]))
    }

    /// Delete an annotation by id.
    ///
    /// The server is asked first; only after a 2xx response are the marker
    /// and the list entry dropped, so a failed delete leaves the display
    /// consistent with the store. Returns the server's `removed` flag
    /// (`false` for an id the server no longer has -- not an error).
    pub async fn remove(&mut self, id: &str) -> Result<bool, ViewerError> {
        self.ensure_ready()?;

        let removed = self.api.delete(id).await?;

        self.remove_marker(id);
        self.annotations.retain(|a| a.id != id);
        Ok(removed)
    }

    /// Display projection of the annotation list, newest-first.
    pub fn formatted(&self) -> Vec<FormattedAnnotation> {
        self.annotations
            .iter()
            .map(|a| FormattedAnnotation {
                id: a.id.clone(),
                text: a.text.clone(),
                pos_text: format!(
                    "{:.3}, {:.3}, {:.3}",
                    a.position.x, a.position.y, a.position.z
                ),
                created_at: a.created_at,
            })
            .collect()
    }

    fn ensure_ready(&self) -> Result<(), ViewerError> {
        if self.state != ViewerState::Ready {
            return Err(ViewerError::NotReady);
        }
        Ok(())
    }

    /// Instantiate a marker for an annotation unless one already exists.
    fn add_marker(&mut self, annotation: &Annotation) {
        if self.markers.contains(&annotation.id) {
            return;
        }

        let radius = marker_radius(
            self.scene
                .as_ref()
                .and_then(|scene| self.engine.bounding_diagonal(scene)),
        );
        let handle = self
            .engine
            .add_marker(marker_position(annotation.position, radius), radius);
        self.markers.track(&annotation.id, handle);
    }

    /// Remove and dispose the marker for an id, if one exists.
    fn remove_marker(&mut self, id: &str) {
        if let Some(handle) = self.markers.untrack(id) {
            self.engine.remove_marker(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use chrono::Utc;
    use cloudmark_client::StatusCode;

    // -- Mock engine -------------------------------------------------------

    /// Engine double that hands out integer marker handles and records
    /// which ones were disposed.
    #[derive(Default)]
    struct MockEngine {
        diagonal: Option<f64>,
        pick_result: Option<Position>,
        fail_load: bool,
        next_handle: u32,
        live: Vec<u32>,
        disposed: Vec<u32>,
    }

    #[async_trait]
    impl PointCloudEngine for MockEngine {
        type Scene = ();
        type Marker = u32;

        async fn load_scene(&mut self, url: &str) -> Result<(), EngineError> {
            if self.fail_load {
                return Err(EngineError::LoadFailed(url.to_string()));
            }
            Ok(())
        }

        fn pick(&self, _pointer: ScreenPoint) -> Option<Position> {
            self.pick_result
        }

        fn add_marker(&mut self, _position: Position, _radius: f64) -> u32 {
            self.next_handle += 1;
            self.live.push(self.next_handle);
            self.next_handle
        }

        fn remove_marker(&mut self, marker: u32) {
            self.live.retain(|&m| m != marker);
            self.disposed.push(marker);
        }

        fn bounding_diagonal(&self, _scene: &()) -> Option<f64> {
            self.diagonal
        }
    }

    // -- Mock API ----------------------------------------------------------

    #[derive(Default)]
    struct MockApi {
        items: Mutex<Vec<Annotation>>,
        fail_list: bool,
        create_calls: AtomicUsize,
    }

    impl MockApi {
        fn with_items(items: Vec<Annotation>) -> Self {
            Self {
                items: Mutex::new(items),
                ..Self::default()
            }
        }

        fn create_calls(&self) -> usize {
            self.create_calls.load(Ordering::SeqCst)
        }
    }

    fn annotation(id: &str, text: &str) -> Annotation {
        Annotation {
            id: id.to_string(),
            text: text.to_string(),
            position: Position::new(1.0, 2.0, 3.0),
            created_at: Utc::now(),
        }
    }

    #[async_trait]
    impl AnnotationApi for MockApi {
        async fn list(&self) -> Result<Vec<Annotation>, ClientError> {
            if self.fail_list {
                return Err(ClientError::Api {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: "boom".to_string(),
                });
            }
            Ok(self.items.lock().unwrap().clone())
        }

        async fn create(&self, position: &Position, text: &str) -> Result<Annotation, ClientError> {
            let n = self.create_calls.fetch_add(1, Ordering::SeqCst);
            let created = Annotation {
                id: format!("id-{n}"),
                text: text.to_string(),
                position: *position,
                created_at: Utc::now(),
            };
            self.items.lock().unwrap().insert(0, created.clone());
            Ok(created)
        }

        async fn delete(&self, id: &str) -> Result<bool, ClientError> {
            let mut items = self.items.lock().unwrap();
            let before = items.len();
            items.retain(|a| a.id != id);
            Ok(items.len() != before)
        }
    }

    fn ready_shell() -> ViewerShell<MockEngine, MockApi> {
        ViewerShell::new(MockEngine::default(), MockApi::default())
    }

    // -- Tests -------------------------------------------------------------

    #[tokio::test]
    async fn start_renders_existing_annotations() {
        let api = MockApi::with_items(vec![annotation("a", "one"), annotation("b", "two")]);
        let mut shell = ViewerShell::new(MockEngine::default(), api);

        let report = shell.start("clouds/lion.js").await.unwrap();

        assert_eq!(shell.state(), ViewerState::Ready);
        assert_eq!(report.loaded, 2);
        assert!(report.fetch_error.is_none());
        assert_eq!(shell.annotations().len(), 2);
        assert_eq!(shell.marker_count(), 2);
    }

    #[tokio::test]
    async fn start_fails_open_when_the_fetch_fails() {
        let api = MockApi {
            fail_list: true,
            ..MockApi::default()
        };
        let mut shell = ViewerShell::new(MockEngine::default(), api);

        let report = shell.start("clouds/lion.js").await.unwrap();

        // The viewer is still usable; the error is reported, not raised.
        assert_eq!(shell.state(), ViewerState::Ready);
        assert_eq!(report.loaded, 0);
        assert!(report.fetch_error.is_some());
        assert!(shell.annotations().is_empty());
    }

    #[tokio::test]
    async fn start_resets_on_scene_load_failure() {
        let engine = MockEngine {
            fail_load: true,
            ..MockEngine::default()
        };
        let mut shell = ViewerShell::new(engine, MockApi::default());

        let err = shell.start("clouds/broken.js").await.unwrap_err();

        assert_matches!(err, ViewerError::Engine(EngineError::LoadFailed(_)));
        assert_eq!(shell.state(), ViewerState::Uninitialized);
    }

    #[tokio::test]
    async fn start_twice_is_rejected() {
        let mut shell = ready_shell();
        shell.start("clouds/lion.js").await.unwrap();

        assert_matches!(
            shell.start("clouds/lion.js").await,
            Err(ViewerError::AlreadyStarted)
        );
    }

    #[tokio::test]
    async fn pick_is_a_noop_before_ready_and_on_miss() {
        let shell = ready_shell();
        assert!(shell.pick(ScreenPoint { x: 10.0, y: 20.0 }).is_none());

        let mut shell = ready_shell();
        shell.start("clouds/lion.js").await.unwrap();
        // Mock engine defaults to a miss.
        assert!(shell.pick(ScreenPoint { x: 10.0, y: 20.0 }).is_none());
    }

    #[tokio::test]
    async fn pick_resolves_a_hit() {
        let engine = MockEngine {
            pick_result: Some(Position::new(4.0, 5.0, 6.0)),
            ..MockEngine::default()
        };
        let mut shell = ViewerShell::new(engine, MockApi::default());
        shell.start("clouds/lion.js").await.unwrap();

        assert_eq!(
            shell.pick(ScreenPoint { x: 10.0, y: 20.0 }),
            Some(Position::new(4.0, 5.0, 6.0))
        );
    }

    #[tokio::test]
    async fn annotate_creates_a_marker_and_prepends_the_record() {
        let mut shell = ready_shell();
        shell.start("clouds/lion.js").await.unwrap();
        shell
            .annotate(Position::new(0.0, 0.0, 0.0), "first")
            .await
            .unwrap();

        let created = shell
            .annotate(Position::new(1.0, 2.0, 3.0), "second")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(created.text, "second");

        assert_eq!(shell.annotations()[0].text, "second");
        assert_eq!(shell.annotations()[1].text, "first");
        assert_eq!(shell.marker_count(), 2);
    }

    #[tokio::test]
    async fn annotate_trims_and_cancels_on_empty_text() {
        let mut shell = ready_shell();
        shell.start("clouds/lion.js").await.unwrap();

        let outcome = shell
            .annotate(Position::new(0.0, 0.0, 0.0), "   ")
            .await
            .unwrap();

        assert!(outcome.is_none());
        assert_eq!(shell.api.create_calls(), 0);
        assert_eq!(shell.marker_count(), 0);
    }

    #[tokio::test]
    async fn text_byte_limit_is_checked_before_any_network_call() {
        let mut shell = ready_shell();
        shell.start("clouds/lion.js").await.unwrap();

        // Exactly 256 bytes passes.
        let ok = shell
            .annotate(Position::new(0.0, 0.0, 0.0), &"a".repeat(256))
            .await
            .unwrap();
        assert!(ok.is_some());
        assert_eq!(shell.api.create_calls(), 1);

        // 257 bytes is rejected locally: no second create call happens.
        let err = shell
            .annotate(Position::new(0.0, 0.0, 0.0), &"a".repeat(257))
            .await
            .unwrap_err();
        assert_matches!(err, ViewerError::TextTooLong { len: 257 });
        assert_eq!(shell.api.create_calls(), 1);
    }

    #[tokio::test]
    async fn remove_disposes_the_marker_handle() {
        let mut shell = ready_shell();
        shell.start("clouds/lion.js").await.unwrap();

        let id = shell
            .annotate(Position::new(0.0, 0.0, 0.0), "note")
            .await
            .unwrap()
            .unwrap()
            .id
            .clone();
        assert_eq!(shell.marker_count(), 1);

        assert!(shell.remove(&id).await.unwrap());

        assert_eq!(shell.marker_count(), 0);
        assert!(shell.annotations().is_empty());
        // The engine must have disposed the handle, not just dropped it.
        assert!(shell.engine.live.is_empty());
        assert_eq!(shell.engine.disposed.len(), 1);
    }

    #[tokio::test]
    async fn remove_of_an_unknown_id_reports_false_without_error() {
        let mut shell = ready_shell();
        shell.start("clouds/lion.js").await.unwrap();

        assert!(!shell.remove("no-such-id").await.unwrap());
    }

    #[tokio::test]
    async fn markers_never_duplicate_for_one_id() {
        let api = MockApi::with_items(vec![annotation("a", "one")]);
        let mut shell = ViewerShell::new(MockEngine::default(), api);
        shell.start("clouds/lion.js").await.unwrap();

        // Re-adding the same annotation is guarded by the existence check.
        let existing = shell.annotations()[0].clone();
        shell.add_marker(&existing);

        assert_eq!(shell.marker_count(), 1);
        assert_eq!(shell.engine.live.len(), 1);
    }

    #[tokio::test]
    async fn formatted_projects_positions_to_three_decimals() {
        let mut api = MockApi::default();
        api.items.lock().unwrap().push(Annotation {
            id: "a".into(),
            text: "note".into(),
            position: Position::new(1.23456, -2.0, 0.5),
            created_at: Utc::now(),
        });
        let mut shell = ViewerShell::new(MockEngine::default(), api);
        shell.start("clouds/lion.js").await.unwrap();

        let formatted = shell.formatted();
        assert_eq!(formatted[0].pos_text, "1.235, -2.000, 0.500");
    }

    #[test]
    fn lifecycle_guard_claims_initialization_once() {
        let lifecycle = ViewerLifecycle::new();

        assert!(!lifecycle.is_initialized());
        assert!(lifecycle.initialize());
        assert!(lifecycle.is_initialized());
        // A repeated mount must not construct a second viewer.
        assert!(!lifecycle.initialize());
    }
}
