//! Collision avoidance for new content.
//!
//! This is a greedy search, not packing: start at the desired spot and step
//! along one axis until nothing overlaps or the attempt cap runs out. In-flight
//! placements reserve their slot through [`PendingPlacements`] so two
//! generations started together do not land on top of each other.

use crate::config::LayoutConfig;
use crate::geometry::{Bounds, Point, Size};
use crate::profile_scope;
use crate::spatial_index::SpatialIndex;
use crate::types::{ObjectId, OperationType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Position reservation for content that has not resolved yet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingPlacement {
    pub id: ObjectId,
    pub x: f64,
    pub y: f64,
    pub expected_width: f64,
    pub expected_height: f64,
    pub operation: OperationType,
}

impl PendingPlacement {
    pub fn new(id: ObjectId, bounds: Bounds, operation: OperationType) -> Self {
        Self {
            id,
            x: bounds.x,
            y: bounds.y,
            expected_width: bounds.width,
            expected_height: bounds.height,
            operation,
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, self.expected_width, self.expected_height)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PendingPlacements {
    entries: Vec<PendingPlacement>,
}

impl PendingPlacements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace the reservation for `entry.id`.
    pub fn register(&mut self, entry: PendingPlacement) {
        self.entries.retain(|e| e.id != entry.id);
        self.entries.push(entry);
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<PendingPlacement> {
        let pos = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(pos))
    }

    pub fn get(&self, id: ObjectId) -> Option<&PendingPlacement> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingPlacement> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Everything a new placement must avoid: board objects and pending reservations.
pub struct Obstacles<'a> {
    index: Option<&'a SpatialIndex>,
    pending: &'a PendingPlacements,
}

impl<'a> Obstacles<'a> {
    pub fn new(index: &'a SpatialIndex, pending: &'a PendingPlacements) -> Self {
        Self {
            index: Some(index),
            pending,
        }
    }

    /// Only pending reservations, no board.
    pub fn pending_only(pending: &'a PendingPlacements) -> Self {
        Self { index: None, pending }
    }

    /// Strict overlap with anything other than `exclude`.
    pub fn overlaps(&self, rect: &Bounds, exclude: Option<ObjectId>) -> bool {
        if self.index.is_some_and(|index| index.any_overlap(rect, exclude)) {
            return true;
        }
        self.pending
            .iter()
            .any(|p| Some(p.id) != exclude && p.bounds().overlaps(rect))
    }
}

/// Result of a collision-avoidance search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutOutcome {
    /// Top-left corner to place the content at
    pub position: Point,
    /// Candidates examined
    pub attempts: usize,
    /// True when every candidate overlapped and `position` is the last one tried
    pub exhausted: bool,
}

/// Step from `desired` until the box no longer overlaps an obstacle.
///
/// The step is `max(spacing, size + margin)` along x when `prefer_horizontal`
/// is set, otherwise along y.
pub fn find_non_overlapping_position(
    desired: Point,
    size: Size,
    exclude: Option<ObjectId>,
    prefer_horizontal: bool,
    obstacles: &Obstacles<'_>,
    config: &LayoutConfig,
) -> LayoutOutcome {
    profile_scope!("find_non_overlapping_position");
    let step = if prefer_horizontal {
        Point::new(config.spacing.max(size.width + config.margin), 0.0)
    } else {
        Point::new(0.0, config.spacing.max(size.height + config.margin))
    };
    let max_attempts = config.max_attempts.max(1);

    let mut candidate = desired;
    for attempt in 1..=max_attempts {
        let rect = Bounds::from_origin_size(candidate, size);
        if !obstacles.overlaps(&rect, exclude) {
            if attempt > 1 {
                debug!(attempts = attempt, x = candidate.x, y = candidate.y, "Layout moved placement");
            }
            return LayoutOutcome {
                position: candidate,
                attempts: attempt,
                exhausted: false,
            };
        }
        if attempt < max_attempts {
            candidate = candidate + step;
        }
    }

    warn!(
        attempts = max_attempts,
        x = candidate.x,
        y = candidate.y,
        "No free position found, placing with overlap"
    );
    LayoutOutcome {
        position: candidate,
        attempts: max_attempts,
        exhausted: true,
    }
}

/// Top-left corner for content placed to the right of `source`, top aligned.
pub fn position_right_of(source: &Bounds, gap: f64) -> Point {
    Point::new(source.right() + gap, source.y)
}

/// Identifies one item of a multi-output generation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchSlot {
    pub group_id: String,
    pub index: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct BatchBlock {
    anchor: Point,
    top: f64,
    columns: usize,
    total: usize,
    cell: Size,
}

/// Grid layout for batches, memoised per group so every item of a group
/// computes against the same block.
#[derive(Debug, Clone, Default)]
pub struct BatchLayout {
    blocks: HashMap<String, BatchBlock>,
    /// Vertical offset below all blocks laid out so far
    next_row_offset: f64,
}

impl BatchLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Top-left corner for `slot`. The first call for a group fixes its block;
    /// later calls reuse it whatever anchor they pass.
    pub fn position(&mut self, slot: &BatchSlot, anchor: Point, cell: Size, config: &LayoutConfig) -> Point {
        let gap = config.grid_gap;
        let block = match self.blocks.get(&slot.group_id) {
            Some(block) => *block,
            None => {
                let total = slot.total.max(1);
                let columns = total.min(config.grid_columns.max(1));
                let rows = total.div_ceil(columns);
                let block = BatchBlock {
                    anchor,
                    top: anchor.y - cell.height / 2.0 + self.next_row_offset,
                    columns,
                    total,
                    cell,
                };
                self.next_row_offset += rows as f64 * (cell.height + gap);
                self.blocks.insert(slot.group_id.clone(), block);
                debug!(group = %slot.group_id, total, columns, rows, "New batch block");
                block
            }
        };

        let index = slot.index.min(block.total - 1);
        let row = index / block.columns;
        let col = index % block.columns;
        let in_row = (block.total - row * block.columns).min(block.columns);
        let row_width = in_row as f64 * block.cell.width + (in_row.saturating_sub(1)) as f64 * gap;

        Point::new(
            block.anchor.x - row_width / 2.0 + col as f64 * (block.cell.width + gap),
            block.top + row as f64 * (block.cell.height + gap),
        )
    }

    pub fn contains_group(&self, group_id: &str) -> bool {
        self.blocks.contains_key(group_id)
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
        self.next_row_offset = 0.0;
    }
}
