//! Genboard - object placement and interaction engine for a 2D canvas editor.
//!
//! The engine keeps the authoritative board of canvas objects, places
//! asynchronously produced content without overlaps, and turns pointer and
//! keyboard input into selection, drag, resize and drawing gestures.
//! Rendering, undo storage and content fetching are collaborators behind the
//! [`SceneGraph`], [`HistoryService`] and [`ContentResolver`] traits, so the
//! whole engine runs headless in tests.
//!
//! ## Module Organization
//!
//! - `engine` - [`CanvasEngine`], selection, deletion, view and frame flushes
//! - `placement` - placeholder lifecycle, retries and timeouts
//! - `layout` - non-overlap search and batch grids
//! - `input` - pointer/keyboard state machine and shortcuts
//! - `gesture` - drag and resize math, frame-coalesced writes
//! - `selection` - hit testing and box selection
//! - `board`, `spatial_index` - objects in z-order and their R-tree
//! - `viewport` - zoom, pan and device pixel ratio
//! - `events` - typed event bus
//! - `config` - JSON settings

pub mod board;
pub mod config;
pub mod constants;
pub mod content;
pub mod engine;
pub mod error;
pub mod events;
pub mod geometry;
pub mod gesture;
pub mod history;
pub mod input;
pub mod layout;
pub mod perf;
pub mod placement;
pub mod scene;
pub mod selection;
pub mod spatial_index;
pub mod types;
pub mod viewport;

pub use config::EngineConfig;
pub use content::{ContentDims, ContentResolver, PassthroughResolver, RenderableSource};
pub use engine::CanvasEngine;
pub use error::{EngineError, EngineResult, FailureReason};
pub use events::{EngineEvent, EventBus, EventCategory, EventFilter};
pub use geometry::{Bounds, Point, Size};
pub use history::{CheckpointLog, HistoryService};
pub use input::{KeyEvent, Modifiers, PointerButton, PointerEvent};
pub use placement::{PlacementRequest, PlacementStatus};
pub use scene::{HeadlessScene, SceneGraph};
pub use types::{CanvasObject, ObjectId, ObjectKind, OperationType, ToolMode};
pub use viewport::ViewState;

/// Install a `tracing` subscriber for hosts that have none.
///
/// The filter comes from `RUST_LOG`, defaulting to `info`. Fails if a global
/// subscriber is already set.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(env_filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;

    Ok(())
}
