//! Engine-wide constants.
//!
//! Centralizes magic numbers so the defaults in [`crate::config`] and the
//! input handlers agree on the same values.

use std::time::Duration;

// ============================================================================
// Object Geometry
// ============================================================================

/// Minimum width/height of any object, in canvas units
pub const MIN_OBJECT_SIZE: f64 = 50.0;

/// Default size for placeholders when the caller gives no expected size
pub const DEFAULT_PLACEHOLDER_SIZE: (f64, f64) = (512.0, 512.0);

/// Maximum dimension for local images (scaled down if larger)
pub const MAX_IMAGE_DIMENSION: f64 = 800.0;

/// Default text object size
pub const DEFAULT_TEXT_SIZE: (f64, f64) = (200.0, 60.0);

// ============================================================================
// Zoom & Pan
// ============================================================================

/// Minimum zoom level
pub const MIN_ZOOM: f64 = 0.1;

/// Maximum zoom level
pub const MAX_ZOOM: f64 = 10.0;

/// Default zoom level
pub const DEFAULT_ZOOM: f64 = 1.0;

/// Multiplicative zoom step for keyboard zoom
pub const ZOOM_STEP: f64 = 1.2;

// ============================================================================
// Input Handling
// ============================================================================

/// Screen-space distance that separates a click from a drag
pub const DRAG_THRESHOLD_PX: f64 = 3.0;

/// Minimum drag distance to create a drawn shape (prevents accidental creation)
pub const MIN_DRAW_DISTANCE: f64 = 10.0;

/// Minimum size for marquee selection to trigger
pub const MIN_MARQUEE_SIZE: f64 = 5.0;

/// Screen-space radius of a resize handle hit area
pub const HANDLE_RADIUS_PX: f64 = 8.0;

/// Screen-space stroke tolerance for path hit testing
pub const PATH_HIT_TOLERANCE_PX: f64 = 6.0;

/// Maximum history checkpoints retained by [`crate::history::CheckpointLog`]
pub const MAX_HISTORY_STATES: usize = 50;

// ============================================================================
// Layout
// ============================================================================

/// Base step used when searching for a free position
pub const LAYOUT_SPACING: f64 = 120.0;

/// Margin added to content size when deriving the search step
pub const LAYOUT_MARGIN: f64 = 20.0;

/// Maximum candidates tested before giving up
pub const MAX_LAYOUT_ATTEMPTS: usize = 50;

/// Items per row in a batch generation grid
pub const GRID_COLUMNS: usize = 4;

/// Gap between cells of a batch generation grid
pub const GRID_GAP: f64 = 24.0;

/// Horizontal gap between a source object and its edit/blend result
pub const EDIT_GAP: f64 = 40.0;

// ============================================================================
// Placement
// ============================================================================

/// How long content may take to load before the placement times out
pub const PLACEMENT_TIMEOUT: Duration = Duration::from_secs(20);

/// Path prefix of proxied remote content; the remainder is the encoded direct URL
pub const DEFAULT_PROXY_PREFIX: &str = "/api/proxy?url=";
