//! Input state machine - one explicit state for every pointer interaction.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Panning            (middle button, Pan tool, or Space held in a selection-like tool)
//! Idle -> DraggingObjects    (press on an object; moves once past the drag threshold)
//! Idle -> ResizingObject     (press on a resize handle of a selected object)
//! Idle -> BoxSelecting       (press on empty canvas with the Select tool)
//! Idle -> Drawing            (press with a line, rect or ellipse tool)
//!
//! Any -> Idle                (pointer up commits, pointer leave or Escape cancels)
//! ```

use crate::geometry::{Bounds, Point};
use crate::gesture::{DragState, ResizeState};
use crate::types::ToolMode;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum InputState {
    /// No active input operation
    #[default]
    Idle,

    /// Canvas panning
    Panning {
        /// Last pointer position in device pixels
        last_screen: Point,
    },

    /// Dragging every selected object. `moved == false` is move-ready.
    DraggingObjects(DragState),

    ResizingObject(ResizeState),

    /// Marquee selection, corners in canvas space
    BoxSelecting {
        start: Point,
        current: Point,
        start_screen: Point,
        current_screen: Point,
    },

    /// Drawing a path shape
    Drawing {
        tool: ToolMode,
        start: Point,
        current: Point,
        start_screen: Point,
    },
}

impl InputState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_panning(&self) -> bool {
        matches!(self, Self::Panning { .. })
    }

    pub fn is_dragging_objects(&self) -> bool {
        matches!(self, Self::DraggingObjects(_))
    }

    pub fn is_resizing(&self) -> bool {
        matches!(self, Self::ResizingObject(_))
    }

    pub fn is_box_selecting(&self) -> bool {
        matches!(self, Self::BoxSelecting { .. })
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self, Self::Drawing { .. })
    }

    /// Gestures during which selection and deletion requests wait.
    pub fn blocks_external_mutation(&self) -> bool {
        matches!(
            self,
            Self::DraggingObjects(_) | Self::ResizingObject(_) | Self::BoxSelecting { .. }
        )
    }

    /// Current marquee rectangle in canvas space.
    pub fn marquee_rect(&self) -> Option<Bounds> {
        match self {
            Self::BoxSelecting { start, current, .. } => Some(Bounds::from_corners(*start, *current)),
            _ => None,
        }
    }

    /// Preview rectangle of a shape being drawn.
    pub fn drawing_rect(&self) -> Option<Bounds> {
        match self {
            Self::Drawing { start, current, .. } => Some(Bounds::from_corners(*start, *current)),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Panning { .. } => "panning",
            Self::DraggingObjects(_) => "dragging_objects",
            Self::ResizingObject(_) => "resizing_object",
            Self::BoxSelecting { .. } => "box_selecting",
            Self::Drawing { .. } => "drawing",
        }
    }
}
