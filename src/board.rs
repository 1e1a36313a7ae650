//! The scene of record: canvas objects in z-order plus in-flight placeholders.
//!
//! The board owns the only authoritative copy of object bounds. The render
//! scene may run ahead during a gesture (frame-coalesced writes) but the board
//! and its spatial index are only updated when a gesture commits.

use crate::geometry::{Bounds, Point};
use crate::spatial_index::SpatialIndex;
use crate::types::{CanvasObject, ObjectId, PlaceholderEntry};

/// Object arena ordered bottom to top, with an R-tree keyed by id.
#[derive(Default)]
pub struct Board {
    objects: Vec<CanvasObject>,
    placeholders: Vec<PlaceholderEntry>,
    index: SpatialIndex,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object on top of the stack. Replaces an existing object with the same id.
    pub fn add_object(&mut self, object: CanvasObject) {
        self.objects.retain(|o| o.id != object.id);
        self.index.insert(object.id, object.bounds);
        self.objects.push(object);
    }

    pub fn remove_object(&mut self, id: ObjectId) -> Option<CanvasObject> {
        let pos = self.objects.iter().position(|o| o.id == id)?;
        self.index.remove(id);
        Some(self.objects.remove(pos))
    }

    pub fn object(&self, id: ObjectId) -> Option<&CanvasObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Mutable access for non-geometric fields. Use [`Board::set_bounds`] for bounds.
    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut CanvasObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    pub fn contains_object(&self, id: ObjectId) -> bool {
        self.index.get(id).is_some()
    }

    /// Objects bottom to top.
    pub fn objects(&self) -> &[CanvasObject] {
        &self.objects
    }

    pub fn object_ids(&self) -> Vec<ObjectId> {
        self.objects.iter().map(|o| o.id).collect()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty() && self.placeholders.is_empty()
    }

    /// Write bounds to the object and the spatial index together.
    pub fn set_bounds(&mut self, id: ObjectId, bounds: Bounds) -> bool {
        let Some(object) = self.objects.iter_mut().find(|o| o.id == id) else {
            return false;
        };
        object.bounds = bounds;
        self.index.insert(id, bounds);
        true
    }

    /// Move an object to the top of the z-order.
    pub fn bring_to_front(&mut self, id: ObjectId) -> bool {
        let Some(pos) = self.objects.iter().position(|o| o.id == id) else {
            return false;
        };
        if pos + 1 != self.objects.len() {
            let object = self.objects.remove(pos);
            self.objects.push(object);
        }
        true
    }

    /// Position of the object in the z-order, 0 is the bottom.
    pub fn z_index(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| o.id == id)
    }

    /// Objects whose bounds contain the point, topmost first.
    pub fn objects_at(&self, point: Point) -> Vec<&CanvasObject> {
        let mut hits: Vec<(usize, &CanvasObject)> = self
            .index
            .query_point(point.x, point.y)
            .into_iter()
            .filter_map(|id| {
                let z = self.z_index(id)?;
                Some((z, &self.objects[z]))
            })
            .collect();
        hits.sort_by(|a, b| b.0.cmp(&a.0));
        hits.into_iter().map(|(_, o)| o).collect()
    }

    /// Objects whose bounds touch or intersect the rectangle, bottom to top.
    pub fn objects_in_rect(&self, rect: &Bounds) -> Vec<&CanvasObject> {
        let mut hits: Vec<(usize, &CanvasObject)> = self
            .index
            .query_rect(rect)
            .into_iter()
            .filter_map(|entry| {
                let z = self.z_index(entry.id)?;
                Some((z, &self.objects[z]))
            })
            .collect();
        hits.sort_by_key(|(z, _)| *z);
        hits.into_iter().map(|(_, o)| o).collect()
    }

    pub fn spatial_index(&self) -> &SpatialIndex {
        &self.index
    }

    pub fn add_placeholder(&mut self, entry: PlaceholderEntry) {
        self.placeholders.retain(|p| p.id != entry.id);
        self.placeholders.push(entry);
    }

    pub fn remove_placeholder(&mut self, id: ObjectId) -> Option<PlaceholderEntry> {
        let pos = self.placeholders.iter().position(|p| p.id == id)?;
        Some(self.placeholders.remove(pos))
    }

    pub fn placeholder(&self, id: ObjectId) -> Option<&PlaceholderEntry> {
        self.placeholders.iter().find(|p| p.id == id)
    }

    pub fn placeholder_mut(&mut self, id: ObjectId) -> Option<&mut PlaceholderEntry> {
        self.placeholders.iter_mut().find(|p| p.id == id)
    }

    pub fn placeholders(&self) -> &[PlaceholderEntry] {
        &self.placeholders
    }

    /// Topmost placeholder under the point. Placeholders render above objects.
    pub fn placeholder_at(&self, point: Point) -> Option<&PlaceholderEntry> {
        self.placeholders.iter().rev().find(|p| p.bounds.contains(point))
    }

    pub fn clear(&mut self) {
        self.objects.clear();
        self.placeholders.clear();
        self.index.clear();
    }
}
