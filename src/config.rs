//! Engine configuration.
//!
//! Settings are stored as JSON at `<config_dir>/genboard/engine.json`. Every
//! field has a default so partial files are fine.

use crate::constants::*;
use crate::types::ObjectKind;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// How resolved content is sized relative to its placeholder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    /// Letterbox the content inside the placeholder box
    #[default]
    Fit,
    /// Native content dimensions centred on the placeholder
    Original,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub min_object_size: f64,
    pub drag_threshold_px: f64,
    pub min_draw_distance_px: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            min_object_size: MIN_OBJECT_SIZE,
            drag_threshold_px: DRAG_THRESHOLD_PX,
            min_draw_distance_px: MIN_DRAW_DISTANCE,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }
}

/// Which object kinds box selection picks up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub include_images: bool,
    pub include_videos: bool,
    pub include_models: bool,
    pub include_text: bool,
    pub include_paths: bool,
    /// Also query the external node-graph layer, when one is attached
    pub include_nodes: bool,
    pub handle_radius_px: f64,
    pub path_hit_tolerance_px: f64,
    pub min_marquee_px: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            include_images: true,
            include_videos: true,
            include_models: true,
            include_text: true,
            include_paths: true,
            include_nodes: false,
            handle_radius_px: HANDLE_RADIUS_PX,
            path_hit_tolerance_px: PATH_HIT_TOLERANCE_PX,
            min_marquee_px: MIN_MARQUEE_SIZE,
        }
    }
}

impl SelectionConfig {
    /// Whether box selection picks up objects of this kind.
    pub fn includes(&self, kind: ObjectKind) -> bool {
        match kind {
            ObjectKind::Image => self.include_images,
            ObjectKind::Video => self.include_videos,
            ObjectKind::Model => self.include_models,
            ObjectKind::Text => self.include_text,
            ObjectKind::Path => self.include_paths,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub spacing: f64,
    pub margin: f64,
    pub max_attempts: usize,
    pub grid_columns: usize,
    pub grid_gap: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            spacing: LAYOUT_SPACING,
            margin: LAYOUT_MARGIN,
            max_attempts: MAX_LAYOUT_ATTEMPTS,
            grid_columns: GRID_COLUMNS,
            grid_gap: GRID_GAP,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    pub timeout_ms: u64,
    pub display_mode: DisplayMode,
    pub default_size: (f64, f64),
    pub edit_gap: f64,
    pub proxy_prefix: String,
    pub max_image_dimension: f64,
    /// Pan the view so freshly resolved content is centred
    pub center_on_placement: bool,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            timeout_ms: PLACEMENT_TIMEOUT.as_millis() as u64,
            display_mode: DisplayMode::default(),
            default_size: DEFAULT_PLACEHOLDER_SIZE,
            edit_gap: EDIT_GAP,
            proxy_prefix: DEFAULT_PROXY_PREFIX.to_string(),
            max_image_dimension: MAX_IMAGE_DIMENSION,
            center_on_placement: false,
        }
    }
}

impl PlacementConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub interaction: InteractionConfig,
    pub selection: SelectionConfig,
    pub layout: LayoutConfig,
    pub placement: PlacementConfig,
}

impl EngineConfig {
    /// Default location of the config file, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("genboard").join("engine.json"))
    }

    /// Load from the default location, falling back to defaults on any problem.
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        if !path.exists() {
            debug!(path = %path.display(), "No engine config, using defaults");
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load engine config, using defaults");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading engine config {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("parsing engine config {}", path.display()))?;
        Ok(config.sanitized())
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating config dir {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("writing engine config {}", path.display()))?;
        Ok(())
    }

    /// Repair values that would break invariants (zero floors, empty grids).
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        if !(self.interaction.min_object_size > 0.0) {
            self.interaction.min_object_size = MIN_OBJECT_SIZE;
        }
        if !(self.interaction.min_zoom > 0.0) || self.interaction.min_zoom > self.interaction.max_zoom {
            self.interaction.min_zoom = MIN_ZOOM;
            self.interaction.max_zoom = MAX_ZOOM;
        }
        for value in [&mut self.layout.spacing, &mut self.layout.margin, &mut self.layout.grid_gap] {
            if !(*value >= 0.0) {
                *value = 0.0;
            }
        }
        self.layout.grid_columns = self.layout.grid_columns.max(1);
        self.layout.max_attempts = self.layout.max_attempts.max(1);
        self
    }
}
