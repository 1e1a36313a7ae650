//! Pointer down - pan, resize, upload slots, selection and tool start.
//!
//! ## Performance Notes
//!
//! Pointer down is a hot path. Hit testing goes through the R-tree, and only
//! path objects pay for a precise stroke test.

use crate::constants::DEFAULT_TEXT_SIZE;
use crate::content::ContentResolver;
use crate::engine::CanvasEngine;
use crate::events::EngineEvent;
use crate::geometry::{Bounds, Point};
use crate::gesture::{DragState, ResizeState};
use crate::history::HistoryService;
use crate::input::cursor::CursorStyle;
use crate::input::{InputState, PointerButton, PointerEvent};
use crate::placement::PlacementRequest;
use crate::profile_scope;
use crate::scene::{HelperGeometry, SceneGraph};
use crate::selection::HitTarget;
use crate::types::{CanvasObject, ContentRef, ObjectId, ObjectKind, OperationType, ToolMode};
use tracing::{debug, warn};

impl<S: SceneGraph, H: HistoryService, R: ContentResolver> CanvasEngine<S, H, R> {
    pub fn pointer_down(&mut self, event: &PointerEvent) {
        profile_scope!("pointer_down");

        if !self.input.is_idle() {
            debug!(state = self.input.name(), "Pointer down during gesture ignored");
            return;
        }
        if self.text_editing.is_some() {
            self.cancel_text_edit();
        }

        let screen = event.position;
        let canvas = self.view.to_canvas_space(screen);

        let space_pan = self.space_held && self.tool.is_selection_like();
        if event.button == PointerButton::Middle || self.tool == ToolMode::Pan || space_pan {
            self.input = InputState::Panning { last_screen: screen };
            self.set_cursor(CursorStyle::Grabbing);
            return;
        }
        if event.button != PointerButton::Primary {
            return;
        }

        if self.tool.is_drawing() {
            self.start_drawing(canvas, screen);
            return;
        }

        // Resize handles of selected objects win over everything under them
        let zoom = self.view.zoom();
        if let Some((id, handle)) =
            self.selector
                .hit_test_handle(&self.board, &self.selection, canvas, zoom, &self.config.selection)
        {
            if let Some(object) = self.board.object(id) {
                debug!(%id, ?handle, "Resize started");
                self.input = InputState::ResizingObject(ResizeState::new(
                    id,
                    handle,
                    canvas,
                    object.bounds,
                    object.content.clone(),
                ));
                self.set_cursor(handle.cursor());
                return;
            }
        }

        let hit = self
            .selector
            .hit_test(&self.board, &self.scene, canvas, zoom, &self.config.selection);

        match hit {
            Some(HitTarget::Placeholder(id)) => self.press_placeholder(id),
            Some(HitTarget::Object(id)) => self.press_object(id, event, canvas),
            None => self.press_empty(event, canvas, screen),
        }
    }

    fn press_placeholder(&mut self, id: ObjectId) {
        let awaiting = self.board.placeholder(id).is_some_and(|p| p.awaiting_upload);
        self.update_selection(|s| s.select_placeholder(id));
        if awaiting {
            debug!(%id, "Upload slot clicked");
            self.events.publish(EngineEvent::UploadRequested { id });
        }
    }

    fn press_object(&mut self, id: ObjectId, event: &PointerEvent, canvas: Point) {
        if event.modifiers.command() {
            self.update_selection(|s| s.toggle(id));
            if !self.selection.contains(id) {
                return;
            }
        } else if !self.selection.contains(id) {
            self.update_selection(|s| s.replace([id]));
        }
        // Otherwise a click on a member keeps the group for a move

        if self.board.bring_to_front(id) {
            self.scene.bring_to_front(id);
        }

        let start_bounds: Vec<(ObjectId, Bounds)> = self
            .selection
            .ids()
            .iter()
            .filter_map(|sid| self.board.object(*sid).map(|o| (*sid, o.bounds)))
            .collect();
        self.input = InputState::DraggingObjects(DragState::new(canvas, event.position, start_bounds));
    }

    fn press_empty(&mut self, event: &PointerEvent, canvas: Point, screen: Point) {
        match self.tool {
            ToolMode::Select => {
                let additive = event.modifiers.shift || event.modifiers.command();
                if !additive {
                    self.clear_selection();
                }
                self.input = InputState::BoxSelecting {
                    start: canvas,
                    current: canvas,
                    start_screen: screen,
                    current_screen: screen,
                };
            }
            ToolMode::PlaceImage | ToolMode::PlaceModel => {
                let kind = if self.tool == ToolMode::PlaceModel {
                    ObjectKind::Model
                } else {
                    ObjectKind::Image
                };
                let request = PlacementRequest::new(kind, OperationType::Upload)
                    .at(canvas)
                    .awaiting_upload();
                match self.request_placement(request) {
                    Ok(id) => self.update_selection(|s| s.select_placeholder(id)),
                    Err(e) => warn!(error = %e, "Could not create upload slot"),
                }
            }
            ToolMode::Text => {
                self.start_text_object(canvas);
            }
            _ => {}
        }
    }

    fn start_drawing(&mut self, canvas: Point, screen: Point) {
        if !self.selection.is_empty() {
            self.clear_selection();
        }
        self.input = InputState::Drawing {
            tool: self.tool,
            start: canvas,
            current: canvas,
            start_screen: screen,
        };
    }

    /// Create an empty text object at `canvas` and start editing it in place.
    fn start_text_object(&mut self, canvas: Point) -> ObjectId {
        let id = ObjectId::new();
        let bounds = Bounds::new(canvas.x, canvas.y, DEFAULT_TEXT_SIZE.0, DEFAULT_TEXT_SIZE.1)
            .clamped(self.config.interaction.min_object_size);
        let object = CanvasObject::new(id, ObjectKind::Text, bounds, ContentRef::Text(String::new()));

        self.scene.create_object(&object);
        self.scene.create_helpers(id, &HelperGeometry::for_bounds(bounds));
        self.board.add_object(object);
        self.update_selection(|s| s.replace([id]));
        self.text_editing = Some(id);

        self.events.publish(EngineEvent::ObjectAdded {
            id,
            kind: ObjectKind::Text,
            bounds,
        });
        self.events.publish(EngineEvent::TextEditStarted { id });
        id
    }
}
