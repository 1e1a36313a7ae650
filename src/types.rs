//! Core types for the genboard canvas engine.
//!
//! This module defines the object model shared by every subsystem: canvas
//! objects, their content references, placeholders for content that is still
//! loading, and the tool modes the input dispatcher switches between.

use crate::geometry::{Bounds, Point, Size};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable identifier for objects, placeholders and placements.
///
/// A placement keeps its id from request to final object so callers can
/// correlate "the image I asked for" with "the image now on canvas".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(Uuid);

impl ObjectId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// What kind of content an object displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Image,
    Video,
    Model,
    Text,
    Path,
}

impl ObjectKind {
    pub fn label(&self) -> &'static str {
        match self {
            ObjectKind::Image => "image",
            ObjectKind::Video => "video",
            ObjectKind::Model => "model",
            ObjectKind::Text => "text",
            ObjectKind::Path => "path",
        }
    }
}

/// Vector geometry carried by path objects.
///
/// Line endpoints are offsets from the object origin so moving the object
/// never has to touch the shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathShape {
    Line { start: Point, end: Point },
    Rect,
    Ellipse,
}

/// Reference to the content an object renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentRef {
    /// Remote or local locator for raster, video or model content
    Source(String),
    /// Plain text for text objects
    Text(String),
    /// Vector geometry for path objects
    Shape(PathShape),
}

impl ContentRef {
    /// Rescale shape offsets after a resize. Other content is size independent.
    #[must_use]
    pub fn rescaled(&self, scale_x: f64, scale_y: f64) -> Self {
        match self {
            ContentRef::Shape(PathShape::Line { start, end }) => ContentRef::Shape(PathShape::Line {
                start: Point::new(start.x * scale_x, start.y * scale_y),
                end: Point::new(end.x * scale_x, end.y * scale_y),
            }),
            other => other.clone(),
        }
    }
}

/// Layer an object belongs to. Layer 0 is the default content layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(pub u32);

/// An object placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasObject {
    pub id: ObjectId,
    pub kind: ObjectKind,
    /// Position and size in canvas units
    pub bounds: Bounds,
    pub visible: bool,
    pub selected: bool,
    pub layer_id: LayerId,
    pub content: ContentRef,
}

impl CanvasObject {
    pub fn new(id: ObjectId, kind: ObjectKind, bounds: Bounds, content: ContentRef) -> Self {
        Self {
            id,
            kind,
            bounds,
            visible: true,
            selected: false,
            layer_id: LayerId::default(),
            content,
        }
    }

    pub fn is_path(&self) -> bool {
        self.kind == ObjectKind::Path
    }
}

/// What triggered a placement. Drives position heuristics and step axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    Upload,
    Generate,
    Edit,
    Blend,
    Paste,
}

impl OperationType {
    /// Edits and blends read left to right from their sources.
    pub fn prefers_horizontal(&self) -> bool {
        matches!(self, OperationType::Edit | OperationType::Blend)
    }

    pub fn label(&self) -> &'static str {
        match self {
            OperationType::Upload => "upload",
            OperationType::Generate => "generate",
            OperationType::Edit => "edit",
            OperationType::Blend => "blend",
            OperationType::Paste => "paste",
        }
    }
}

/// Transient stand-in for content that has not resolved yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceholderEntry {
    pub id: ObjectId,
    pub bounds: Bounds,
    pub operation: OperationType,
    pub kind: ObjectKind,
    /// Progress in `0.0..=1.0`
    pub progress: f32,
    /// True while the placeholder is an empty slot waiting for the user to pick a file
    pub awaiting_upload: bool,
}

impl PlaceholderEntry {
    pub fn expected_size(&self) -> Size {
        self.bounds.size()
    }
}

/// Tool modes for the toolbar.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolMode {
    #[default]
    Select,
    DrawLine,
    DrawRect,
    DrawEllipse,
    PlaceImage,
    PlaceModel,
    Text,
    Pan,
}

impl ToolMode {
    /// Modes where holding Space turns a press into a pan-drag.
    pub fn is_selection_like(&self) -> bool {
        matches!(
            self,
            ToolMode::Select | ToolMode::PlaceImage | ToolMode::PlaceModel | ToolMode::Text
        )
    }

    /// Modes that create a path object by dragging.
    pub fn is_drawing(&self) -> bool {
        matches!(self, ToolMode::DrawLine | ToolMode::DrawRect | ToolMode::DrawEllipse)
    }
}
