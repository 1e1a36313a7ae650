//! Spatial Index Module
//!
//! Provides R-tree based spatial indexing for hit testing, box selection and
//! collision queries. Point lookups are O(log n) instead of a scan over every
//! object on the board.

use crate::geometry::Bounds;
use crate::types::ObjectId;
use rstar::{AABB, RTree, RTreeObject};
use std::collections::HashMap;

/// A spatial entry representing an object's bounding box.
#[derive(Debug, Clone, Copy)]
pub struct SpatialEntry {
    pub id: ObjectId,
    pub bounds: Bounds,
}

impl SpatialEntry {
    pub fn new(id: ObjectId, bounds: Bounds) -> Self {
        Self { id, bounds }
    }
}

impl RTreeObject for SpatialEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.bounds.x, self.bounds.y],
            [self.bounds.right(), self.bounds.bottom()],
        )
    }
}

impl PartialEq for SpatialEntry {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// Spatial index over object bounds using an R-tree.
#[derive(Default)]
pub struct SpatialIndex {
    tree: RTree<SpatialEntry>,
    entries: HashMap<ObjectId, SpatialEntry>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for `id`.
    pub fn insert(&mut self, id: ObjectId, bounds: Bounds) {
        if let Some(old_entry) = self.entries.remove(&id) {
            self.tree.remove(&old_entry);
        }

        let entry = SpatialEntry::new(id, bounds);
        self.tree.insert(entry);
        self.entries.insert(id, entry);
    }

    pub fn remove(&mut self, id: ObjectId) -> bool {
        if let Some(entry) = self.entries.remove(&id) {
            self.tree.remove(&entry);
            true
        } else {
            false
        }
    }

    /// All ids whose bounds contain the point (inclusive).
    pub fn query_point(&self, x: f64, y: f64) -> Vec<ObjectId> {
        let point_envelope = AABB::from_point([x, y]);

        self.tree
            .locate_in_envelope_intersecting(&point_envelope)
            .map(|entry| entry.id)
            .collect()
    }

    /// All entries whose bounds touch or intersect the rectangle.
    pub fn query_rect(&self, rect: &Bounds) -> Vec<SpatialEntry> {
        let envelope = AABB::from_corners([rect.x, rect.y], [rect.right(), rect.bottom()]);

        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .copied()
            .collect()
    }

    /// Whether any entry other than `exclude` strictly overlaps `rect`.
    pub fn any_overlap(&self, rect: &Bounds, exclude: Option<ObjectId>) -> bool {
        self.query_rect(rect)
            .iter()
            .any(|entry| Some(entry.id) != exclude && entry.bounds.overlaps(rect))
    }

    pub fn get(&self, id: ObjectId) -> Option<Bounds> {
        self.entries.get(&id).map(|e| e.bounds)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.tree = RTree::new();
        self.entries.clear();
    }
}
