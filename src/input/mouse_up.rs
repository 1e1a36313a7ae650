//! Pointer up - commit gestures, finish shapes, resolve box selection.
//! Also gesture cancellation for pointer leave and Escape.

use crate::content::ContentResolver;
use crate::engine::CanvasEngine;
use crate::events::EngineEvent;
use crate::geometry::{Bounds, Point};
use crate::gesture::{DragState, ResizeState};
use crate::history::HistoryService;
use crate::input::{InputState, PointerEvent};
use crate::profile_scope;
use crate::scene::{HelperGeometry, SceneGraph};
use crate::types::{CanvasObject, ContentRef, ObjectId, ObjectKind, PathShape, ToolMode};
use tracing::debug;

impl<S: SceneGraph, H: HistoryService, R: ContentResolver> CanvasEngine<S, H, R> {
    pub fn pointer_up(&mut self, event: &PointerEvent) {
        profile_scope!("pointer_up");

        let screen = event.position;
        let canvas = self.view.to_canvas_space(screen);

        match std::mem::take(&mut self.input) {
            InputState::Idle | InputState::Panning { .. } => {}
            InputState::DraggingObjects(drag) => {
                if drag.moved {
                    self.finish_drag(drag);
                }
            }
            InputState::ResizingObject(resize) => {
                if resize.changed() {
                    self.finish_resize(resize);
                } else {
                    self.frames.discard();
                }
            }
            InputState::BoxSelecting { start, start_screen, .. } => {
                self.finish_box_select(start, canvas, start_screen, screen);
            }
            InputState::Drawing {
                tool,
                start,
                start_screen,
                ..
            } => {
                let screen_distance = start_screen.distance(screen);
                self.finish_drawing(tool, start, canvas, screen_distance);
            }
        }

        self.apply_deferred();
        let cursor = self.hover_cursor(canvas);
        self.set_cursor(cursor);
    }

    /// Pointer left the canvas: abandon whatever gesture was running.
    pub fn pointer_leave(&mut self) {
        self.cancel_gesture();
    }

    /// Restore pre-gesture bounds in the scene. Nothing is committed.
    pub fn cancel_gesture(&mut self) {
        self.line_anchor = None;
        match std::mem::take(&mut self.input) {
            InputState::DraggingObjects(drag) => {
                self.frames.discard();
                if drag.moved {
                    for (id, bounds) in &drag.start_bounds {
                        self.restore_scene_bounds(*id, *bounds);
                    }
                }
                debug!("Drag cancelled");
            }
            InputState::ResizingObject(resize) => {
                self.frames.discard();
                self.restore_scene_bounds(resize.target, resize.start_bounds);
                debug!("Resize cancelled");
            }
            InputState::Idle => return,
            _ => {}
        }
        self.apply_deferred();
        let cursor = self.idle_cursor();
        self.set_cursor(cursor);
    }

    fn restore_scene_bounds(&mut self, id: ObjectId, bounds: Bounds) {
        self.scene.set_bounds(id, bounds);
        if self.selection.contains(id) {
            self.scene.sync_helpers(id, &HelperGeometry::for_bounds(bounds));
        }
    }

    /// Flush whatever is still queued so the scene ends on the final bounds.
    fn flush_frames_now(&mut self) {
        for (id, bounds) in self.frames.take() {
            self.scene.set_bounds(id, bounds);
        }
    }

    fn finish_drag(&mut self, drag: DragState) {
        self.flush_frames_now();
        for (id, bounds) in &drag.current {
            if !self.board.set_bounds(*id, *bounds) {
                continue;
            }
            self.scene.sync_helpers(*id, &HelperGeometry::for_bounds(*bounds));
            self.events.publish(EngineEvent::ObjectMoved { id: *id, bounds: *bounds });
        }
        debug!(count = drag.current.len(), "Drag committed");
        self.history.commit("move");
    }

    fn finish_resize(&mut self, resize: ResizeState) {
        self.flush_frames_now();
        let id = resize.target;
        let bounds = resize.current;
        if !self.board.set_bounds(id, bounds) {
            return;
        }
        if let Some(object) = self.board.object_mut(id) {
            if object.is_path() {
                object.content = resize.scaled_content();
            }
        }
        self.scene.sync_helpers(id, &HelperGeometry::for_bounds(bounds));
        self.events.publish(EngineEvent::ObjectResized { id, bounds });
        debug!(%id, width = bounds.width, height = bounds.height, "Resize committed");
        self.history.commit("resize");
    }

    fn finish_box_select(&mut self, start: Point, end: Point, start_screen: Point, end_screen: Point) {
        let min = self.config.selection.min_marquee_px;
        let screen_rect = Bounds::from_corners(start_screen, end_screen);
        if screen_rect.width <= min && screen_rect.height <= min {
            return;
        }

        let rect = Bounds::from_corners(start, end);
        let (ids, nodes) = self
            .selector
            .box_select(&self.board, &rect, &self.config.selection, self.node_layer.as_deref());
        debug!(count = ids.len(), nodes = nodes.len(), "Box selection");
        self.update_selection(|s| {
            for id in ids {
                s.insert(id);
            }
            if !nodes.is_empty() {
                s.set_nodes(nodes);
            }
        });
    }

    fn finish_drawing(&mut self, tool: ToolMode, start: Point, end: Point, screen_distance: f64) {
        match tool {
            ToolMode::DrawLine => {
                if screen_distance < self.config.interaction.drag_threshold_px {
                    // Two-click line: first click anchors, second completes
                    match self.line_anchor.take() {
                        Some(anchor) => self.add_line(anchor, end),
                        None => self.line_anchor = Some(end),
                    }
                } else {
                    self.line_anchor = None;
                    self.add_line(start, end);
                }
            }
            ToolMode::DrawRect | ToolMode::DrawEllipse => {
                if screen_distance < self.config.interaction.min_draw_distance_px {
                    debug!(screen_distance, "Shape too small, discarded");
                    return;
                }
                let shape = if tool == ToolMode::DrawRect {
                    PathShape::Rect
                } else {
                    PathShape::Ellipse
                };
                let bounds = Bounds::from_corners(start, end).clamped(self.config.interaction.min_object_size);
                self.add_path(bounds, shape);
            }
            _ => {}
        }
    }

    fn add_line(&mut self, a: Point, b: Point) {
        let bounds = Bounds::from_corners(a, b).clamped(self.config.interaction.min_object_size);
        let origin = bounds.origin();
        self.add_path(
            bounds,
            PathShape::Line {
                start: a - origin,
                end: b - origin,
            },
        );
    }

    fn add_path(&mut self, bounds: Bounds, shape: PathShape) {
        let id = ObjectId::new();
        let object = CanvasObject::new(id, ObjectKind::Path, bounds, ContentRef::Shape(shape));
        self.scene.create_object(&object);
        self.scene.create_helpers(id, &HelperGeometry::for_bounds(bounds));
        self.board.add_object(object);
        self.update_selection(|s| s.replace([id]));
        self.events.publish(EngineEvent::ObjectAdded {
            id,
            kind: ObjectKind::Path,
            bounds,
        });
        self.history.commit("draw");
    }
}
