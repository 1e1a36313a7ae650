//! Render scene collaborator.
//!
//! The engine drives the renderer through [`SceneGraph`] and never reads
//! geometry back from it, with one exception: precise hit testing of vector
//! paths, which only the renderer can do against the real stroke.
//!
//! [`HeadlessScene`] records every command and hit-tests paths analytically,
//! which is enough to run the engine without a window.

use crate::content::RenderableSource;
use crate::geometry::{Bounds, Point};
use crate::types::{CanvasObject, ContentRef, ObjectId, PathShape, PlaceholderEntry};
use crate::viewport::ViewState;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Selection border and corner handle positions for one object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HelperGeometry {
    pub border: Bounds,
    /// Corner handles in nw, ne, sw, se order
    pub handles: [Point; 4],
}

impl HelperGeometry {
    pub fn for_bounds(bounds: Bounds) -> Self {
        Self {
            border: bounds,
            handles: [
                Point::new(bounds.x, bounds.y),
                Point::new(bounds.right(), bounds.y),
                Point::new(bounds.x, bounds.bottom()),
                Point::new(bounds.right(), bounds.bottom()),
            ],
        }
    }
}

pub trait SceneGraph {
    fn show_placeholder(&mut self, entry: &PlaceholderEntry);
    fn update_placeholder_progress(&mut self, id: ObjectId, progress: f32);
    fn remove_placeholder(&mut self, id: ObjectId);

    fn create_object(&mut self, object: &CanvasObject);
    fn remove_object(&mut self, id: ObjectId);
    fn set_bounds(&mut self, id: ObjectId, bounds: Bounds);
    fn bring_to_front(&mut self, id: ObjectId);

    /// Create the selection border and handles owned by `owner`.
    fn create_helpers(&mut self, owner: ObjectId, geometry: &HelperGeometry);
    fn sync_helpers(&mut self, owner: ObjectId, geometry: &HelperGeometry);
    fn set_helpers_visible(&mut self, owner: ObjectId, visible: bool);
    fn remove_helpers(&mut self, owner: ObjectId);

    /// Precise hit test against the rendered stroke. `tolerance` is in canvas units.
    fn hit_test_path(&self, object: &CanvasObject, point: Point, tolerance: f64) -> bool;

    /// Begin loading content into the placeholder slot `id`. The host reports
    /// the outcome back with the same `attempt`.
    fn load_content(&mut self, id: ObjectId, attempt: u32, source: &RenderableSource);

    /// Ask for a single `on_animation_frame` callback.
    fn request_animation_frame(&mut self);

    fn update_view(&mut self, view: &ViewState);
}

/// Everything the engine asked the scene to do, in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum SceneCommand {
    ShowPlaceholder { id: ObjectId, bounds: Bounds },
    PlaceholderProgress { id: ObjectId, progress: f32 },
    RemovePlaceholder { id: ObjectId },
    CreateObject { id: ObjectId, bounds: Bounds },
    RemoveObject { id: ObjectId },
    SetBounds { id: ObjectId, bounds: Bounds },
    BringToFront { id: ObjectId },
    CreateHelpers { owner: ObjectId },
    SyncHelpers { owner: ObjectId, border: Bounds },
    SetHelpersVisible { owner: ObjectId, visible: bool },
    RemoveHelpers { owner: ObjectId },
    LoadContent { id: ObjectId, attempt: u32, source: RenderableSource },
    RequestAnimationFrame,
    UpdateView { zoom: f64 },
}

/// A scene with no renderer behind it.
#[derive(Debug, Default)]
pub struct HeadlessScene {
    commands: Vec<SceneCommand>,
    bounds: HashMap<ObjectId, Bounds>,
    helpers: HashMap<ObjectId, HelperGeometry>,
    visible_helpers: HashSet<ObjectId>,
    placeholders: HashSet<ObjectId>,
}

impl HeadlessScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[SceneCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<SceneCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Bounds as last written to the scene, which may run ahead of the board mid-gesture.
    pub fn rendered_bounds(&self, id: ObjectId) -> Option<Bounds> {
        self.bounds.get(&id).copied()
    }

    pub fn helpers(&self, owner: ObjectId) -> Option<&HelperGeometry> {
        self.helpers.get(&owner)
    }

    pub fn helpers_visible(&self, owner: ObjectId) -> bool {
        self.visible_helpers.contains(&owner)
    }

    pub fn has_placeholder(&self, id: ObjectId) -> bool {
        self.placeholders.contains(&id)
    }

    pub fn count(&self, pred: impl Fn(&SceneCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }

    pub fn frame_requests(&self) -> usize {
        self.count(|c| matches!(c, SceneCommand::RequestAnimationFrame))
    }
}

impl SceneGraph for HeadlessScene {
    fn show_placeholder(&mut self, entry: &PlaceholderEntry) {
        self.placeholders.insert(entry.id);
        self.commands.push(SceneCommand::ShowPlaceholder {
            id: entry.id,
            bounds: entry.bounds,
        });
    }

    fn update_placeholder_progress(&mut self, id: ObjectId, progress: f32) {
        self.commands.push(SceneCommand::PlaceholderProgress { id, progress });
    }

    fn remove_placeholder(&mut self, id: ObjectId) {
        self.placeholders.remove(&id);
        self.commands.push(SceneCommand::RemovePlaceholder { id });
    }

    fn create_object(&mut self, object: &CanvasObject) {
        self.bounds.insert(object.id, object.bounds);
        self.commands.push(SceneCommand::CreateObject {
            id: object.id,
            bounds: object.bounds,
        });
    }

    fn remove_object(&mut self, id: ObjectId) {
        self.bounds.remove(&id);
        self.commands.push(SceneCommand::RemoveObject { id });
    }

    fn set_bounds(&mut self, id: ObjectId, bounds: Bounds) {
        self.bounds.insert(id, bounds);
        self.commands.push(SceneCommand::SetBounds { id, bounds });
    }

    fn bring_to_front(&mut self, id: ObjectId) {
        self.commands.push(SceneCommand::BringToFront { id });
    }

    fn create_helpers(&mut self, owner: ObjectId, geometry: &HelperGeometry) {
        self.helpers.insert(owner, *geometry);
        self.commands.push(SceneCommand::CreateHelpers { owner });
    }

    fn sync_helpers(&mut self, owner: ObjectId, geometry: &HelperGeometry) {
        self.helpers.insert(owner, *geometry);
        self.commands.push(SceneCommand::SyncHelpers {
            owner,
            border: geometry.border,
        });
    }

    fn set_helpers_visible(&mut self, owner: ObjectId, visible: bool) {
        if visible {
            self.visible_helpers.insert(owner);
        } else {
            self.visible_helpers.remove(&owner);
        }
        self.commands.push(SceneCommand::SetHelpersVisible { owner, visible });
    }

    fn remove_helpers(&mut self, owner: ObjectId) {
        self.helpers.remove(&owner);
        self.visible_helpers.remove(&owner);
        self.commands.push(SceneCommand::RemoveHelpers { owner });
    }

    fn hit_test_path(&self, object: &CanvasObject, point: Point, tolerance: f64) -> bool {
        path_contains(object, point, tolerance)
    }

    fn load_content(&mut self, id: ObjectId, attempt: u32, source: &RenderableSource) {
        self.commands.push(SceneCommand::LoadContent {
            id,
            attempt,
            source: source.clone(),
        });
    }

    fn request_animation_frame(&mut self) {
        self.commands.push(SceneCommand::RequestAnimationFrame);
    }

    fn update_view(&mut self, view: &ViewState) {
        self.commands.push(SceneCommand::UpdateView { zoom: view.zoom() });
    }
}

/// Analytic hit test for path shapes.
///
/// Lines test distance to the segment. Rectangles and ellipses count their
/// filled interior, grown by `tolerance`.
pub fn path_contains(object: &CanvasObject, point: Point, tolerance: f64) -> bool {
    let b = object.bounds;
    match &object.content {
        ContentRef::Shape(PathShape::Line { start, end }) => {
            let a = b.origin() + *start;
            let z = b.origin() + *end;
            distance_to_segment(point, a, z) <= tolerance
        }
        ContentRef::Shape(PathShape::Ellipse) => {
            let c = b.center();
            let rx = b.width / 2.0 + tolerance;
            let ry = b.height / 2.0 + tolerance;
            if rx <= 0.0 || ry <= 0.0 {
                return false;
            }
            let dx = (point.x - c.x) / rx;
            let dy = (point.y - c.y) / ry;
            dx * dx + dy * dy <= 1.0
        }
        _ => b.inflate(tolerance).contains(point),
    }
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len_sq = ab.dot(ab);
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + ab.x * t, a.y + ab.y * t);
    p.distance(proj)
}
