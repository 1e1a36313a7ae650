//! Drag and resize gesture state plus frame-coalesced scene writes.
//!
//! A gesture captures start bounds on pointer-down and recomputes target
//! bounds from `pointer - start` on every move, so rounding never
//! accumulates. Writes go through [`FrameBuffer`] and reach the scene at most
//! once per id per animation frame. Board and spatial index only see the
//! final bounds on release.

use crate::geometry::{Bounds, Point};
use crate::input::cursor::CursorStyle;
use crate::perf::FrameStats;
use crate::types::{ContentRef, ObjectId};
use serde::{Deserialize, Serialize};

/// Corner resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeHandle {
    Nw,
    Ne,
    Sw,
    Se,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 4] = [ResizeHandle::Nw, ResizeHandle::Ne, ResizeHandle::Sw, ResizeHandle::Se];

    /// The corner this handle sits on.
    pub fn corner(&self, b: &Bounds) -> Point {
        match self {
            ResizeHandle::Nw => Point::new(b.x, b.y),
            ResizeHandle::Ne => Point::new(b.right(), b.y),
            ResizeHandle::Sw => Point::new(b.x, b.bottom()),
            ResizeHandle::Se => Point::new(b.right(), b.bottom()),
        }
    }

    /// The opposite corner, which stays fixed while resizing.
    pub fn anchor(&self, b: &Bounds) -> Point {
        self.opposite().corner(b)
    }

    pub fn opposite(&self) -> ResizeHandle {
        match self {
            ResizeHandle::Nw => ResizeHandle::Se,
            ResizeHandle::Ne => ResizeHandle::Sw,
            ResizeHandle::Sw => ResizeHandle::Ne,
            ResizeHandle::Se => ResizeHandle::Nw,
        }
    }

    pub fn cursor(&self) -> CursorStyle {
        match self {
            ResizeHandle::Nw | ResizeHandle::Se => CursorStyle::ResizeNwse,
            ResizeHandle::Ne | ResizeHandle::Sw => CursorStyle::ResizeNesw,
        }
    }
}

/// Compute resized bounds for a corner drag.
///
/// With `aspect_lock` the pointer vector from the anchor is projected onto the
/// anchor-to-corner diagonal, so the start aspect ratio is kept exactly. The
/// scale factor is floored so neither side drops below `min_size`. Without
/// the lock each side follows the pointer on its own. The box never flips
/// across its anchor.
pub fn resize_bounds(start: &Bounds, handle: ResizeHandle, pointer: Point, aspect_lock: bool, min_size: f64) -> Bounds {
    let anchor = handle.anchor(start);
    let diagonal = handle.corner(start) - anchor;
    let v = pointer - anchor;

    if aspect_lock {
        let dd = diagonal.dot(diagonal);
        if dd <= f64::EPSILON || start.width <= 0.0 || start.height <= 0.0 {
            return start.clamped(min_size);
        }
        let t_min = (min_size / start.width).max(min_size / start.height);
        let t = (v.dot(diagonal) / dd).max(t_min);
        let corner = Point::new(anchor.x + diagonal.x * t, anchor.y + diagonal.y * t);
        Bounds::from_corners(anchor, corner)
    } else {
        let sx = diagonal.x.signum();
        let sy = diagonal.y.signum();
        let width = (v.x * sx).max(min_size);
        let height = (v.y * sy).max(min_size);
        let corner = Point::new(anchor.x + sx * width, anchor.y + sy * height);
        Bounds::from_corners(anchor, corner)
    }
}

/// Group drag in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    /// Pointer position at press, in canvas space
    pub start_pointer: Point,
    /// Screen position at press, for the drag threshold
    pub start_screen: Point,
    pub start_bounds: Vec<(ObjectId, Bounds)>,
    /// Last bounds computed for every target
    pub current: Vec<(ObjectId, Bounds)>,
    /// False until the pointer crosses the drag threshold
    pub moved: bool,
}

impl DragState {
    pub fn new(start_pointer: Point, start_screen: Point, start_bounds: Vec<(ObjectId, Bounds)>) -> Self {
        Self {
            start_pointer,
            start_screen,
            current: start_bounds.clone(),
            start_bounds,
            moved: false,
        }
    }

    pub fn target_ids(&self) -> Vec<ObjectId> {
        self.start_bounds.iter().map(|(id, _)| *id).collect()
    }

    /// Recompute every target from its start bounds.
    pub fn update(&mut self, pointer: Point) -> &[(ObjectId, Bounds)] {
        let delta = pointer - self.start_pointer;
        self.current = self
            .start_bounds
            .iter()
            .map(|(id, b)| (*id, b.translated(delta)))
            .collect();
        &self.current
    }
}

/// Single-object resize in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeState {
    pub target: ObjectId,
    pub handle: ResizeHandle,
    pub start_pointer: Point,
    pub start_bounds: Bounds,
    /// Content at press; line paths rescale from this
    pub start_content: ContentRef,
    pub current: Bounds,
}

impl ResizeState {
    pub fn new(target: ObjectId, handle: ResizeHandle, start_pointer: Point, start_bounds: Bounds, start_content: ContentRef) -> Self {
        Self {
            target,
            handle,
            start_pointer,
            start_bounds,
            start_content,
            current: start_bounds,
        }
    }

    pub fn anchor(&self) -> Point {
        self.handle.anchor(&self.start_bounds)
    }

    pub fn update(&mut self, pointer: Point, aspect_lock: bool, min_size: f64) -> Bounds {
        self.current = resize_bounds(&self.start_bounds, self.handle, pointer, aspect_lock, min_size);
        self.current
    }

    pub fn changed(&self) -> bool {
        self.current != self.start_bounds
    }

    /// Content scaled to the current bounds.
    pub fn scaled_content(&self) -> ContentRef {
        let sx = if self.start_bounds.width > 0.0 { self.current.width / self.start_bounds.width } else { 1.0 };
        let sy = if self.start_bounds.height > 0.0 { self.current.height / self.start_bounds.height } else { 1.0 };
        self.start_content.rescaled(sx, sy)
    }
}

/// Latest pending bounds per id, flushed once per animation frame.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    pending: Vec<(ObjectId, Bounds)>,
    stats: FrameStats,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a write. Returns true when the buffer went from empty to
    /// pending, which is the only time a frame should be requested.
    pub fn push(&mut self, id: ObjectId, bounds: Bounds) -> bool {
        let was_empty = self.pending.is_empty();
        if let Some(slot) = self.pending.iter_mut().find(|(pid, _)| *pid == id) {
            slot.1 = bounds;
            self.stats.writes_coalesced += 1;
        } else {
            self.pending.push((id, bounds));
        }
        was_empty
    }

    pub fn push_all(&mut self, writes: &[(ObjectId, Bounds)]) -> bool {
        let was_empty = self.pending.is_empty();
        for (id, bounds) in writes {
            self.push(*id, *bounds);
        }
        was_empty && !self.pending.is_empty()
    }

    pub fn is_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Take everything queued for this frame.
    pub fn take(&mut self) -> Vec<(ObjectId, Bounds)> {
        let writes = std::mem::take(&mut self.pending);
        if !writes.is_empty() {
            self.stats.frames_flushed += 1;
            self.stats.writes_applied += writes.len() as u64;
        }
        writes
    }

    /// Drop queued writes without applying them.
    pub fn discard(&mut self) {
        self.pending.clear();
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }
}
