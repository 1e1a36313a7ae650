//! Wheel input - zoom with Ctrl/Cmd, otherwise scroll the canvas.

use crate::content::ContentResolver;
use crate::engine::CanvasEngine;
use crate::geometry::Point;
use crate::history::HistoryService;
use crate::input::Modifiers;
use crate::scene::SceneGraph;

/// Wheel pixels per 100% zoom change.
const WHEEL_ZOOM_DIVISOR: f64 = 500.0;

impl<S: SceneGraph, H: HistoryService, R: ContentResolver> CanvasEngine<S, H, R> {
    /// Handle a wheel event. `delta` is in device pixels, `screen` is the
    /// pointer position in device pixels.
    pub fn handle_wheel(&mut self, delta: Point, screen: Point, modifiers: Modifiers) {
        if modifiers.command() {
            let zoom_factor = 1.0 - delta.y / WHEEL_ZOOM_DIVISOR;
            if zoom_factor > 0.0 && (zoom_factor - 1.0).abs() > 0.001 {
                self.zoom_at(zoom_factor, screen);
            }
            return;
        }

        // Scrolling down moves the content up
        let dpr = self.view.dpr();
        self.pan_by(Point::new(-delta.x / dpr, -delta.y / dpr));
    }
}
