//! Test helpers and builders for reducing boilerplate in tests.
//!
//! This module provides:
//! - `TestEngineBuilder` - builder for headless engines with objects on the board
//! - `MockResolver` - content resolver that records uploads and can proxy URLs
//! - `EventRecorder` - collects every event the engine publishes
//! - `place_object()` - run a placement all the way to a resolved object

#![allow(dead_code)]

use genboard::content::{ContentDims, ContentResolver, RenderableSource, UploadFile, UploadOptions};
use genboard::events::{EngineEvent, EventFilter};
use genboard::geometry::{Bounds, Point, Size};
use genboard::history::CheckpointLog;
use genboard::input::PointerEvent;
use genboard::placement::PlacementRequest;
use genboard::scene::HeadlessScene;
use genboard::types::{ObjectId, ObjectKind, OperationType};
use genboard::{CanvasEngine, EngineConfig};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;

pub type TestEngine = CanvasEngine<HeadlessScene, CheckpointLog, MockResolver>;

// ============================================================================
// MockResolver
// ============================================================================

/// Resolver that records uploads. References starting with `proxied:` are
/// resolved behind the default proxy prefix.
#[derive(Debug, Default)]
pub struct MockResolver {
    pub uploads: Vec<(ObjectId, String)>,
}

impl ContentResolver for MockResolver {
    fn upload(&mut self, id: ObjectId, file: &UploadFile, _options: &UploadOptions) {
        self.uploads.push((id, file.name.clone()));
    }

    fn resolve_any(&self, reference: &str) -> RenderableSource {
        match reference.strip_prefix("proxied:") {
            Some(direct) => RenderableSource::new(format!(
                "{}{}",
                genboard::constants::DEFAULT_PROXY_PREFIX,
                urlencoding::encode(direct)
            )),
            None => RenderableSource::for_reference(reference),
        }
    }
}

// ============================================================================
// EventRecorder
// ============================================================================

#[derive(Clone, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl EventRecorder {
    pub fn attach(engine: &TestEngine) -> Self {
        let recorder = Self::default();
        let sink = recorder.events.clone();
        engine.events().subscribe(EventFilter::All, move |event| {
            sink.lock().push(event.clone());
        });
        recorder
    }

    pub fn all(&self) -> Vec<EngineEvent> {
        self.events.lock().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.events.lock().iter().filter(|e| e.name() == name).count()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

// ============================================================================
// TestEngineBuilder
// ============================================================================

/// Builder for headless engines.
///
/// # Example
/// ```ignore
/// let (mut engine, ids) = TestEngineBuilder::new()
///     .with_image(Bounds::new(0.0, 0.0, 100.0, 100.0))
///     .with_zoom(2.0)
///     .build();
/// ```
pub struct TestEngineBuilder {
    config: EngineConfig,
    zoom: f64,
    pan: Point,
    dpr: f64,
    images: Vec<Bounds>,
}

impl Default for TestEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEngineBuilder {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            zoom: 1.0,
            pan: Point::new(0.0, 0.0),
            dpr: 1.0,
            images: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn with_pan(mut self, x: f64, y: f64) -> Self {
        self.pan = Point::new(x, y);
        self
    }

    pub fn with_dpr(mut self, dpr: f64) -> Self {
        self.dpr = dpr;
        self
    }

    /// Add a resolved image occupying exactly `bounds`.
    pub fn with_image(mut self, bounds: Bounds) -> Self {
        self.images.push(bounds);
        self
    }

    /// Build the engine and return it with the ids of the images, in order.
    pub fn build(self) -> (TestEngine, Vec<ObjectId>) {
        let mut engine = CanvasEngine::new(
            self.config,
            HeadlessScene::new(),
            CheckpointLog::new(),
            MockResolver::default(),
        );
        engine.set_device_pixel_ratio(self.dpr);
        engine.set_zoom(self.zoom);
        engine.set_pan(self.pan);

        let ids = self
            .images
            .into_iter()
            .map(|bounds| place_object(&mut engine, ObjectKind::Image, bounds))
            .collect();
        engine.scene_mut().take_commands();
        (engine, ids)
    }
}

/// Run a placement from request to resolved object at exactly `bounds`.
pub fn place_object(engine: &mut TestEngine, kind: ObjectKind, bounds: Bounds) -> ObjectId {
    let request = PlacementRequest::new(kind, OperationType::Generate)
        .with_size(bounds.size())
        .at(bounds.center());
    let id = engine.request_placement(request).expect("request placement");
    let attempt = engine
        .begin_resolution(id, "https://cdn.example/asset.png", Instant::now())
        .expect("begin resolution");
    engine
        .content_loaded(id, attempt, ContentDims::new(bounds.width, bounds.height))
        .expect("content loaded");
    id
}

/// Attempt number of the load currently running for `id`.
pub fn current_attempt(engine: &TestEngine, id: ObjectId) -> u32 {
    engine.registry().get(id).expect("placement record").attempt
}

pub fn bounds_of(engine: &TestEngine, id: ObjectId) -> Bounds {
    engine.board().object(id).expect("object on board").bounds
}

pub fn size(w: f64, h: f64) -> Size {
    Size::new(w, h)
}

/// Press, move through `path` and release, all with the primary button.
pub fn drag(engine: &mut TestEngine, from: (f64, f64), path: &[(f64, f64)]) {
    engine.pointer_down(&PointerEvent::new(from.0, from.1));
    let mut last = from;
    for p in path {
        engine.pointer_move(&PointerEvent::new(p.0, p.1));
        last = *p;
    }
    engine.pointer_up(&PointerEvent::new(last.0, last.1));
}

pub fn click(engine: &mut TestEngine, x: f64, y: f64) {
    engine.pointer_down(&PointerEvent::new(x, y));
    engine.pointer_up(&PointerEvent::new(x, y));
}
