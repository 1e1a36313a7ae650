//! Coordinate conversion between screen space and canvas space.
//!
//! Screen positions arrive in device pixels. The pan offset is kept in CSS
//! pixels, so the device pixel ratio is divided out before pan and zoom are
//! applied:
//!
//! ```text
//! canvas = (screen / dpr - pan) / zoom
//! screen = (canvas * zoom + pan) * dpr
//! ```
//!
//! All conversions are pure functions of the current [`ViewState`].

use crate::constants::{DEFAULT_ZOOM, MAX_ZOOM, MIN_ZOOM};
use crate::geometry::{Bounds, Point, Size};
use serde::{Deserialize, Serialize};

/// Camera state for the pannable, zoomable surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    zoom: f64,
    /// Pan offset in CSS pixels
    pan: Point,
    /// Device pixel ratio, always >= 1
    dpr: f64,
    /// Visible area in CSS pixels
    viewport_size: Size,
    min_zoom: f64,
    max_zoom: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            pan: Point::default(),
            dpr: 1.0,
            viewport_size: Size::new(1280.0, 800.0),
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }
}

impl ViewState {
    pub fn new(viewport_size: Size, dpr: f64) -> Self {
        Self {
            viewport_size,
            dpr: dpr.max(1.0),
            ..Self::default()
        }
    }

    pub fn with_zoom_limits(mut self, min_zoom: f64, max_zoom: f64) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self.zoom = self.zoom.clamp(min_zoom, max_zoom);
        self
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan(&self) -> Point {
        self.pan
    }

    pub fn dpr(&self) -> f64 {
        self.dpr
    }

    pub fn viewport_size(&self) -> Size {
        self.viewport_size
    }

    /// Set the zoom level, clamped to the configured limits.
    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        }
    }

    pub fn set_pan(&mut self, pan: Point) {
        self.pan = pan;
    }

    pub fn pan_by(&mut self, delta_css: Point) {
        self.pan = self.pan + delta_css;
    }

    /// Device pixel ratios below 1 are treated as 1.
    pub fn set_dpr(&mut self, dpr: f64) {
        self.dpr = if dpr.is_finite() { dpr.max(1.0) } else { 1.0 };
    }

    pub fn set_viewport_size(&mut self, size: Size) {
        self.viewport_size = size;
    }

    /// Convert a device-pixel screen position to canvas space.
    #[inline]
    pub fn to_canvas_space(&self, screen: Point) -> Point {
        Point::new(
            (screen.x / self.dpr - self.pan.x) / self.zoom,
            (screen.y / self.dpr - self.pan.y) / self.zoom,
        )
    }

    /// Convert a canvas position to device-pixel screen space.
    #[inline]
    pub fn to_screen_space(&self, canvas: Point) -> Point {
        Point::new(
            (canvas.x * self.zoom + self.pan.x) * self.dpr,
            (canvas.y * self.zoom + self.pan.y) * self.dpr,
        )
    }

    /// Convert a screen delta (device pixels) to canvas units.
    #[inline]
    pub fn delta_to_canvas(&self, delta: Point) -> Point {
        Point::new(delta.x / (self.dpr * self.zoom), delta.y / (self.dpr * self.zoom))
    }

    /// Zoom by `factor` keeping the canvas point under `screen` fixed.
    ///
    /// Returns true if the zoom level changed.
    pub fn zoom_around(&mut self, factor: f64, screen: Point) -> bool {
        let anchor = self.to_canvas_space(screen);
        let old_zoom = self.zoom;
        self.set_zoom(self.zoom * factor);
        if (self.zoom - old_zoom).abs() < f64::EPSILON {
            return false;
        }
        let css = Point::new(screen.x / self.dpr, screen.y / self.dpr);
        self.pan = Point::new(css.x - anchor.x * self.zoom, css.y - anchor.y * self.zoom);
        true
    }

    /// Canvas point currently at the centre of the viewport.
    pub fn viewport_center(&self) -> Point {
        let css_center = Point::new(self.viewport_size.width / 2.0, self.viewport_size.height / 2.0);
        Point::new(
            (css_center.x - self.pan.x) / self.zoom,
            (css_center.y - self.pan.y) / self.zoom,
        )
    }

    /// Canvas-space rectangle that is currently visible.
    pub fn visible_canvas_rect(&self) -> Bounds {
        let top_left = Point::new(-self.pan.x / self.zoom, -self.pan.y / self.zoom);
        Bounds::new(
            top_left.x,
            top_left.y,
            self.viewport_size.width / self.zoom,
            self.viewport_size.height / self.zoom,
        )
    }

    /// Pan so that `bounds` is centred in the viewport.
    pub fn center_on(&mut self, bounds: &Bounds) {
        let c = bounds.center();
        self.pan = Point::new(
            self.viewport_size.width / 2.0 - c.x * self.zoom,
            self.viewport_size.height / 2.0 - c.y * self.zoom,
        );
    }
}
