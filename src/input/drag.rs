//! Pointer move - drag, resize, pan, marquee and hover cursor.
//!
//! ## Performance Notes
//!
//! Pointer move fires far more often than frames are drawn. Gestures only
//! recompute bounds here; the scene sees them through the frame buffer, at
//! most once per id per animation frame.

use crate::content::ContentResolver;
use crate::engine::CanvasEngine;
use crate::geometry::{Bounds, Point};
use crate::history::HistoryService;
use crate::input::{InputState, PointerEvent};
use crate::profile_scope;
use crate::scene::SceneGraph;
use crate::types::ObjectId;

impl<S: SceneGraph, H: HistoryService, R: ContentResolver> CanvasEngine<S, H, R> {
    pub fn pointer_move(&mut self, event: &PointerEvent) {
        profile_scope!("pointer_move");

        let screen = event.position;
        let canvas = self.view.to_canvas_space(screen);
        let threshold = self.config.interaction.drag_threshold_px;
        let min_size = self.config.interaction.min_object_size;
        let dpr = self.view.dpr();

        let mut writes: Option<Vec<(ObjectId, Bounds)>> = None;
        let mut panned = false;

        match &mut self.input {
            InputState::Idle => {
                let cursor = self.hover_cursor(canvas);
                self.set_cursor(cursor);
                return;
            }
            InputState::Panning { last_screen } => {
                let delta = Point::new((screen.x - last_screen.x) / dpr, (screen.y - last_screen.y) / dpr);
                *last_screen = screen;
                self.view.pan_by(delta);
                panned = true;
            }
            InputState::DraggingObjects(drag) => {
                if !drag.moved {
                    if drag.start_screen.distance(screen) < threshold {
                        return;
                    }
                    drag.moved = true;
                }
                writes = Some(drag.update(canvas).to_vec());
            }
            InputState::ResizingObject(resize) => {
                let aspect_lock = !event.modifiers.shift;
                let bounds = resize.update(canvas, aspect_lock, min_size);
                writes = Some(vec![(resize.target, bounds)]);
            }
            InputState::BoxSelecting {
                current, current_screen, ..
            } => {
                *current = canvas;
                *current_screen = screen;
            }
            InputState::Drawing { current, .. } => {
                *current = canvas;
            }
        }

        if panned {
            self.view_changed();
        }
        if let Some(writes) = writes {
            self.queue_frame_writes(&writes);
        }
    }
}
