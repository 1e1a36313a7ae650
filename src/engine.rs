//! The engine: one struct owning the board, view, selection and gesture
//! state, generic over its render, history and content collaborators.
//!
//! Behaviour is split across modules the same way the state is:
//! - `placement` - placeholder lifecycle and async completions
//! - `input::mouse_down`, `input::drag`, `input::mouse_up` - pointer gestures
//! - `input::keyboard` - keys and shortcuts
//! - this module - construction, selection, deletion, view and frames

use crate::board::Board;
use crate::config::EngineConfig;
use crate::content::{ContentResolver, PassthroughResolver};
use crate::events::{EngineEvent, EventBus};
use crate::geometry::{Point, Size};
use crate::history::{CheckpointLog, HistoryService};
use crate::input::InputState;
use crate::input::cursor::CursorStyle;
use crate::gesture::FrameBuffer;
use crate::perf::FrameStats;
use crate::placement::PlacementRegistry;
use crate::profile_scope;
use crate::scene::{HeadlessScene, SceneGraph};
use crate::selection::{NodeGraphLayer, SelectionEngine, SelectionSet};
use crate::types::{ObjectId, ToolMode};
use crate::viewport::ViewState;
use tracing::debug;

/// Mutation requested while a gesture was running, applied when it ends.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DeferredOp {
    Delete(Vec<ObjectId>),
    SetSelection(Vec<ObjectId>),
}

pub struct CanvasEngine<S = HeadlessScene, H = CheckpointLog, R = PassthroughResolver>
where
    S: SceneGraph,
    H: HistoryService,
    R: ContentResolver,
{
    pub(crate) config: EngineConfig,
    pub(crate) view: ViewState,
    pub(crate) board: Board,

    // Selection
    pub(crate) selection: SelectionSet,
    pub(crate) selector: SelectionEngine,
    pub(crate) node_layer: Option<Box<dyn NodeGraphLayer>>,

    // Input
    pub(crate) input: InputState,
    pub(crate) tool: ToolMode,
    pub(crate) space_held: bool,
    /// First point of a two-click line
    pub(crate) line_anchor: Option<Point>,
    pub(crate) cursor: CursorStyle,
    pub(crate) text_editing: Option<ObjectId>,
    pub(crate) deferred: Vec<DeferredOp>,
    pub(crate) frames: FrameBuffer,

    pub(crate) registry: PlacementRegistry,

    // Collaborators
    pub(crate) scene: S,
    pub(crate) history: H,
    pub(crate) resolver: R,
    pub(crate) events: EventBus,
}

impl CanvasEngine<HeadlessScene, CheckpointLog, PassthroughResolver> {
    /// Engine with no renderer, an in-memory history and pass-through resolution.
    pub fn headless(config: EngineConfig) -> Self {
        Self::new(config, HeadlessScene::new(), CheckpointLog::new(), PassthroughResolver::new())
    }
}

impl<S: SceneGraph, H: HistoryService, R: ContentResolver> CanvasEngine<S, H, R> {
    pub fn new(config: EngineConfig, scene: S, history: H, resolver: R) -> Self {
        Self::with_registry(config, scene, history, resolver, PlacementRegistry::new())
    }

    /// Construct with an existing placement registry, e.g. one shared with a
    /// test harness or restored after a view reload.
    pub fn with_registry(config: EngineConfig, scene: S, history: H, resolver: R, registry: PlacementRegistry) -> Self {
        let config = config.sanitized();
        let view = ViewState::default().with_zoom_limits(config.interaction.min_zoom, config.interaction.max_zoom);
        Self {
            config,
            view,
            board: Board::new(),
            selection: SelectionSet::new(),
            selector: SelectionEngine::new(),
            node_layer: None,
            input: InputState::Idle,
            tool: ToolMode::default(),
            space_held: false,
            line_anchor: None,
            cursor: CursorStyle::Default,
            text_editing: None,
            deferred: Vec::new(),
            frames: FrameBuffer::new(),
            registry,
            scene,
            history,
            resolver,
            events: EventBus::new(),
        }
    }

    /// Replace the event bus, e.g. with one that keeps history.
    #[must_use]
    pub fn with_event_bus(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn input_state(&self) -> &InputState {
        &self.input
    }

    pub fn tool(&self) -> ToolMode {
        self.tool
    }

    pub fn cursor(&self) -> CursorStyle {
        self.cursor
    }

    pub fn text_editing(&self) -> Option<ObjectId> {
        self.text_editing
    }

    pub fn registry(&self) -> &PlacementRegistry {
        &self.registry
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn resolver_mut(&mut self) -> &mut R {
        &mut self.resolver
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn frame_stats(&self) -> FrameStats {
        self.frames.stats()
    }

    pub fn hit_test_profiler(&self) -> &crate::perf::HitTestProfiler {
        self.selector.profiler()
    }

    pub fn set_node_layer(&mut self, layer: Box<dyn NodeGraphLayer>) {
        self.node_layer = Some(layer);
    }

    /// Switch tools. Any half-finished two-click line is dropped.
    pub fn set_tool(&mut self, tool: ToolMode) {
        if self.tool != tool {
            debug!(?tool, "Tool changed");
            self.tool = tool;
            self.line_anchor = None;
            let cursor = self.idle_cursor();
            self.set_cursor(cursor);
        }
    }

    // ------------------------------------------------------------------
    // View
    // ------------------------------------------------------------------

    pub fn set_viewport_size(&mut self, size: Size) {
        self.view.set_viewport_size(size);
        self.view_changed();
    }

    pub fn set_device_pixel_ratio(&mut self, dpr: f64) {
        self.view.set_dpr(dpr);
        self.view_changed();
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.view.set_zoom(zoom);
        self.view_changed();
    }

    /// Zoom keeping the canvas point under `screen` fixed.
    pub fn zoom_at(&mut self, factor: f64, screen: Point) {
        if self.view.zoom_around(factor, screen) {
            self.view_changed();
        }
    }

    /// Pan by a delta in CSS pixels.
    pub fn pan_by(&mut self, delta: Point) {
        self.view.pan_by(delta);
        self.view_changed();
    }

    pub fn set_pan(&mut self, pan: Point) {
        self.view.set_pan(pan);
        self.view_changed();
    }

    pub(crate) fn view_changed(&mut self) {
        self.scene.update_view(&self.view);
        self.events.publish(EngineEvent::ViewportChanged {
            zoom: self.view.zoom(),
            pan: self.view.pan(),
        });
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Apply `change` to the selection, then sync visuals and publish if
    /// anything changed.
    pub(crate) fn update_selection(&mut self, change: impl FnOnce(&mut SelectionSet)) {
        let before = self.selection.clone();
        change(&mut self.selection);
        if before == self.selection {
            return;
        }
        SelectionEngine::sync_visuals(&mut self.board, &mut self.scene, before.ids(), &self.selection);
        self.events.publish(EngineEvent::SelectionChanged {
            ids: self.selection.ids().to_vec(),
            active: self.selection.active(),
            nodes: self.selection.nodes().to_vec(),
        });
    }

    /// Replace the selection. Deferred while a box selection or drag runs.
    pub fn set_selection(&mut self, ids: Vec<ObjectId>) {
        if self.input.blocks_external_mutation() {
            debug!(count = ids.len(), "Deferring selection change until gesture ends");
            self.deferred.push(DeferredOp::SetSelection(ids));
            return;
        }
        let ids: Vec<ObjectId> = ids.into_iter().filter(|id| self.board.contains_object(*id)).collect();
        self.update_selection(|s| s.replace(ids));
    }

    /// Make `id` the active object, adding it to the selection if needed.
    /// Unknown ids are ignored.
    pub fn set_active_object(&mut self, id: ObjectId) {
        if !self.board.contains_object(id) {
            debug!(%id, "Cannot activate unknown object");
            return;
        }
        self.update_selection(|s| s.set_active(id));
    }

    pub fn select_all(&mut self) {
        let ids = self.board.object_ids();
        self.set_selection(ids);
    }

    pub fn clear_selection(&mut self) {
        self.update_selection(SelectionSet::clear);
    }

    // ------------------------------------------------------------------
    // Deletion
    // ------------------------------------------------------------------

    /// Delete objects and placeholders by id, as one undoable step.
    ///
    /// Deferred while a box selection or drag runs.
    pub fn delete_objects(&mut self, ids: Vec<ObjectId>) {
        if self.input.blocks_external_mutation() {
            debug!(count = ids.len(), "Deferring delete until gesture ends");
            self.deferred.push(DeferredOp::Delete(ids));
            return;
        }
        self.delete_now(&ids);
    }

    /// Delete everything selected: objects of every kind and the selected placeholder.
    pub fn delete_selected(&mut self) {
        let mut ids = self.selection.ids().to_vec();
        ids.extend(self.selection.placeholder());
        if !ids.is_empty() {
            self.delete_objects(ids);
        }
    }

    pub(crate) fn delete_now(&mut self, ids: &[ObjectId]) {
        profile_scope!("delete_objects");
        let mut removed = Vec::new();
        for id in ids {
            if self.board.remove_object(*id).is_some() {
                self.scene.remove_helpers(*id);
                self.scene.remove_object(*id);
                self.registry.forget(*id);
                removed.push(*id);
            } else if self.board.placeholder(*id).is_some() && self.cancel_placement_quiet(*id) {
                self.registry.forget(*id);
                removed.push(*id);
            }
        }
        if removed.is_empty() {
            return;
        }
        if self.text_editing.is_some_and(|t| removed.contains(&t)) {
            self.text_editing = None;
        }

        let gone = removed.clone();
        self.update_selection(|s| {
            for id in &gone {
                s.remove(*id);
            }
        });
        debug!(count = removed.len(), "Deleted objects");
        self.events.publish(EngineEvent::ObjectsDeleted { ids: removed });
        self.history.commit("delete");
    }

    pub(crate) fn apply_deferred(&mut self) {
        for op in std::mem::take(&mut self.deferred) {
            match op {
                DeferredOp::Delete(ids) => self.delete_now(&ids),
                DeferredOp::SetSelection(ids) => self.set_selection(ids),
            }
        }
    }

    // ------------------------------------------------------------------
    // Frames
    // ------------------------------------------------------------------

    /// Animation frame callback: push the latest pending bounds to the scene.
    pub fn on_animation_frame(&mut self) {
        profile_scope!("on_animation_frame");
        for (id, bounds) in self.frames.take() {
            self.scene.set_bounds(id, bounds);
            if self.selection.contains(id) {
                self.scene.sync_helpers(id, &crate::scene::HelperGeometry::for_bounds(bounds));
            }
        }
    }

    /// Queue bounds writes, requesting a frame only if none is pending.
    pub(crate) fn queue_frame_writes(&mut self, writes: &[(ObjectId, crate::geometry::Bounds)]) {
        if self.frames.push_all(writes) {
            self.scene.request_animation_frame();
        }
    }

    pub(crate) fn set_cursor(&mut self, cursor: CursorStyle) {
        if self.cursor != cursor {
            self.cursor = cursor;
            self.events.publish(EngineEvent::CursorChanged { cursor });
        }
    }

    /// Drop everything: objects, placeholders, reservations, batch memo,
    /// selection and gesture state. The view is kept.
    pub fn reset(&mut self) {
        for id in self.board.object_ids() {
            self.scene.remove_helpers(id);
            self.scene.remove_object(id);
        }
        for p in self.board.placeholders().iter().map(|p| p.id).collect::<Vec<_>>() {
            self.scene.remove_placeholder(p);
        }
        self.board.clear();
        self.registry.clear();
        self.selection.clear();
        self.input = InputState::Idle;
        self.frames.discard();
        self.deferred.clear();
        self.line_anchor = None;
        self.text_editing = None;
        self.space_held = false;
        debug!("Engine reset");
    }
}
