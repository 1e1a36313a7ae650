//! Pointer and keyboard input for the canvas.
//!
//! ## Architecture
//!
//! The input system uses an explicit state machine (`InputState`) to track
//! the current interaction mode. Every handler is a method on
//! [`CanvasEngine`](crate::CanvasEngine), split by event type:
//!
//! - `state` - input state machine enum and helper methods
//! - `mouse_down` - pointer down (pan, resize, selection, tool start)
//! - `drag` - pointer move (drag, resize, pan, marquee, hover cursor)
//! - `mouse_up` - pointer up and cancellation (commit, draw, box select)
//! - `keyboard` - keys, shortcuts and in-place text editing
//! - `cursor` - cursor affordance for whatever is under the pointer
//! - `transform` - wheel zoom and scroll

pub mod cursor;
pub mod keyboard;
mod drag;
mod mouse_down;
mod mouse_up;
mod state;
mod transform;

pub use keyboard::{ShortcutAction, ShortcutMap};
pub use state::InputState;

use crate::geometry::Point;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PointerButton {
    #[default]
    Primary,
    Middle,
    Secondary,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Modifiers = Modifiers { shift: true, ..Self::NONE };

    pub const CTRL: Modifiers = Modifiers { ctrl: true, ..Self::NONE };

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A pointer event. `position` is in device pixels relative to the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub position: Point,
    pub button: PointerButton,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            button: PointerButton::Primary,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// A key event. `key` follows DOM `KeyboardEvent.key` naming (`"Delete"`, `" "`, `"a"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: String,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}
