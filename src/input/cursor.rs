//! Cursor affordance.
//!
//! With no gesture running, the cursor is a pure function of the tool, the
//! Space key and whatever lies under the pointer.

use crate::content::ContentResolver;
use crate::engine::CanvasEngine;
use crate::geometry::Point;
use crate::history::HistoryService;
use crate::scene::SceneGraph;
use crate::selection::HitTarget;
use crate::types::ToolMode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorStyle {
    #[default]
    Default,
    /// Clickable, used for editable paths and upload slots
    Pointer,
    Move,
    Grab,
    Grabbing,
    Crosshair,
    Text,
    ResizeNwse,
    ResizeNesw,
}

impl CursorStyle {
    /// CSS `cursor` value.
    pub fn css_name(&self) -> &'static str {
        match self {
            CursorStyle::Default => "default",
            CursorStyle::Pointer => "pointer",
            CursorStyle::Move => "move",
            CursorStyle::Grab => "grab",
            CursorStyle::Grabbing => "grabbing",
            CursorStyle::Crosshair => "crosshair",
            CursorStyle::Text => "text",
            CursorStyle::ResizeNwse => "nwse-resize",
            CursorStyle::ResizeNesw => "nesw-resize",
        }
    }
}

impl<S: SceneGraph, H: HistoryService, R: ContentResolver> CanvasEngine<S, H, R> {
    /// Cursor for the current tool when nothing under the pointer matters.
    pub(crate) fn idle_cursor(&self) -> CursorStyle {
        if self.tool == ToolMode::Pan || (self.space_held && self.tool.is_selection_like()) {
            return CursorStyle::Grab;
        }
        match self.tool {
            t if t.is_drawing() => CursorStyle::Crosshair,
            ToolMode::Text => CursorStyle::Text,
            _ => CursorStyle::Default,
        }
    }

    /// Cursor for the canvas point under the pointer.
    pub(crate) fn hover_cursor(&mut self, canvas: Point) -> CursorStyle {
        let idle = self.idle_cursor();
        if idle != CursorStyle::Default {
            return idle;
        }

        let zoom = self.view.zoom();
        if let Some((_, handle)) =
            self.selector
                .hit_test_handle(&self.board, &self.selection, canvas, zoom, &self.config.selection)
        {
            return handle.cursor();
        }

        match self
            .selector
            .hit_test(&self.board, &self.scene, canvas, zoom, &self.config.selection)
        {
            Some(HitTarget::Placeholder(id)) => {
                if self.board.placeholder(id).is_some_and(|p| p.awaiting_upload) {
                    CursorStyle::Pointer
                } else {
                    CursorStyle::Default
                }
            }
            Some(HitTarget::Object(id)) => {
                if self.selection.contains(id) {
                    CursorStyle::Move
                } else if self.board.object(id).is_some_and(|o| o.is_path()) {
                    CursorStyle::Pointer
                } else {
                    CursorStyle::Default
                }
            }
            None => CursorStyle::Default,
        }
    }
}
