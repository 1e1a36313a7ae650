//! Keyboard input: shortcuts, Space-pan, deletion and in-place text editing.
//!
//! Key names follow DOM `KeyboardEvent.key`. Ctrl and Cmd are treated alike.

use crate::constants::{DEFAULT_ZOOM, ZOOM_STEP};
use crate::content::ContentResolver;
use crate::engine::CanvasEngine;
use crate::events::EngineEvent;
use crate::geometry::Point;
use crate::history::HistoryService;
use crate::input::{KeyEvent, Modifiers};
use crate::scene::SceneGraph;
use crate::types::{ContentRef, ToolMode};
use tracing::debug;

/// What a key combination does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    SelectAll,
    SetTool(ToolMode),
    Delete,
    Cancel,
    PanStart,
    ZoomIn,
    ZoomOut,
    ZoomReset,
}

pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key and its modifiers to an action, or `None` when unbound.
    pub fn resolve(key: &str, modifiers: &Modifiers) -> Option<ShortcutAction> {
        if modifiers.command() {
            return match key {
                "a" | "A" => Some(ShortcutAction::SelectAll),
                "=" | "+" => Some(ShortcutAction::ZoomIn),
                "-" => Some(ShortcutAction::ZoomOut),
                "0" => Some(ShortcutAction::ZoomReset),
                _ => None,
            };
        }

        match key {
            "v" | "V" => Some(ShortcutAction::SetTool(ToolMode::Select)),
            "l" | "L" => Some(ShortcutAction::SetTool(ToolMode::DrawLine)),
            "r" | "R" => Some(ShortcutAction::SetTool(ToolMode::DrawRect)),
            "o" | "O" => Some(ShortcutAction::SetTool(ToolMode::DrawEllipse)),
            "t" | "T" => Some(ShortcutAction::SetTool(ToolMode::Text)),
            "h" | "H" => Some(ShortcutAction::SetTool(ToolMode::Pan)),
            "i" | "I" => Some(ShortcutAction::SetTool(ToolMode::PlaceImage)),
            "m" | "M" => Some(ShortcutAction::SetTool(ToolMode::PlaceModel)),
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Cancel),
            " " => Some(ShortcutAction::PanStart),
            _ => None,
        }
    }
}

impl<S: SceneGraph, H: HistoryService, R: ContentResolver> CanvasEngine<S, H, R> {
    /// Handle a key press. Returns whether the engine consumed it.
    ///
    /// While a text object is being edited only Escape is handled; every
    /// other key belongs to the text field.
    pub fn handle_key_down(&mut self, event: &KeyEvent) -> bool {
        if self.text_editing.is_some() {
            if event.key == "Escape" {
                self.cancel_text_edit();
                return true;
            }
            return false;
        }

        let Some(action) = ShortcutMap::resolve(&event.key, &event.modifiers) else {
            return false;
        };
        debug!(?action, "Shortcut");

        match action {
            ShortcutAction::Cancel => self.cancel_gesture(),
            ShortcutAction::PanStart => {
                if !self.space_held {
                    self.space_held = true;
                    if self.input.is_idle() {
                        let cursor = self.idle_cursor();
                        self.set_cursor(cursor);
                    }
                }
            }
            ShortcutAction::Delete => self.delete_selected(),
            ShortcutAction::SelectAll => self.select_all(),
            ShortcutAction::SetTool(tool) => {
                if !self.input.is_idle() {
                    return false;
                }
                self.set_tool(tool);
            }
            ShortcutAction::ZoomIn => {
                let center = self.screen_center();
                self.zoom_at(ZOOM_STEP, center);
            }
            ShortcutAction::ZoomOut => {
                let center = self.screen_center();
                self.zoom_at(1.0 / ZOOM_STEP, center);
            }
            ShortcutAction::ZoomReset => {
                let center = self.screen_center();
                let factor = DEFAULT_ZOOM / self.view.zoom();
                self.zoom_at(factor, center);
            }
        }
        true
    }

    pub fn handle_key_up(&mut self, event: &KeyEvent) -> bool {
        if event.key != " " || !self.space_held {
            return false;
        }
        self.space_held = false;
        if self.input.is_idle() {
            let cursor = self.idle_cursor();
            self.set_cursor(cursor);
        }
        true
    }

    /// Centre of the viewport in device pixels.
    fn screen_center(&self) -> Point {
        let size = self.view.viewport_size();
        let dpr = self.view.dpr();
        Point::new(size.width / 2.0 * dpr, size.height / 2.0 * dpr)
    }

    /// Store `text` in the object being edited and end editing.
    ///
    /// Committing empty text behaves like cancelling. Returns `false` when no
    /// edit was in progress.
    pub fn commit_text(&mut self, text: impl Into<String>) -> bool {
        let Some(id) = self.text_editing else {
            return false;
        };
        let text = text.into();
        if text.trim().is_empty() {
            self.cancel_text_edit();
            return true;
        }

        self.text_editing = None;
        let Some(object) = self.board.object_mut(id) else {
            return false;
        };
        object.content = ContentRef::Text(text);
        let object = object.clone();
        self.scene.remove_object(id);
        self.scene.create_object(&object);

        self.events.publish(EngineEvent::TextEditEnded { id, committed: true });
        self.history.commit("edit text");
        true
    }

    /// End editing without storing anything. A text object that never got
    /// any text is removed again.
    pub fn cancel_text_edit(&mut self) {
        let Some(id) = self.text_editing.take() else {
            return;
        };
        let empty = self
            .board
            .object(id)
            .is_some_and(|o| matches!(&o.content, ContentRef::Text(t) if t.is_empty()));

        self.events.publish(EngineEvent::TextEditEnded { id, committed: false });
        if empty {
            debug!(%id, "Removing empty text object");
            self.board.remove_object(id);
            self.scene.remove_helpers(id);
            self.scene.remove_object(id);
            self.update_selection(|s| {
                s.remove(id);
            });
        }
    }
}
