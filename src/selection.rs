//! Hit testing and selection bookkeeping.

use crate::board::Board;
use crate::config::SelectionConfig;
use crate::geometry::{Bounds, Point};
use crate::gesture::ResizeHandle;
use crate::perf::{HitTestProfiler, measure};
use crate::scene::{HelperGeometry, SceneGraph};
use crate::types::ObjectId;
use crate::profile_scope;
use std::collections::HashSet;

/// External layer of graph nodes that box selection may also sweep.
pub trait NodeGraphLayer {
    /// Ids of nodes whose bounds touch `rect` (canvas space).
    fn nodes_in_rect(&self, rect: &Bounds) -> Vec<String>;
}

/// What lies under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Placeholder(ObjectId),
    Object(ObjectId),
}

impl HitTarget {
    pub fn id(&self) -> ObjectId {
        match self {
            HitTarget::Placeholder(id) | HitTarget::Object(id) => *id,
        }
    }
}

/// Ordered set of selected objects. The last one added is the active one
/// unless the host sets it explicitly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionSet {
    ids: Vec<ObjectId>,
    active: Option<ObjectId>,
    /// At most one placeholder can be selected, independent of objects
    placeholder: Option<ObjectId>,
    nodes: Vec<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(&self) -> &[ObjectId] {
        &self.ids
    }

    pub fn active(&self) -> Option<ObjectId> {
        self.active
    }

    pub fn placeholder(&self) -> Option<ObjectId> {
        self.placeholder
    }

    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty() && self.placeholder.is_none() && self.nodes.is_empty()
    }

    /// Add an id and make it active. Returns false if it was already present.
    pub fn insert(&mut self, id: ObjectId) -> bool {
        self.active = Some(id);
        if self.ids.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    pub fn remove(&mut self, id: ObjectId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|i| *i != id);
        if self.active == Some(id) {
            self.active = self.ids.last().copied();
        }
        if self.placeholder == Some(id) {
            self.placeholder = None;
            return true;
        }
        self.ids.len() != before
    }

    pub fn toggle(&mut self, id: ObjectId) {
        if !self.remove(id) {
            self.insert(id);
        }
    }

    /// Replace the whole selection with `ids`. The last id becomes active.
    pub fn replace(&mut self, ids: impl IntoIterator<Item = ObjectId>) {
        self.clear();
        for id in ids {
            self.insert(id);
        }
    }

    /// Make `id` active. It is added if missing.
    pub fn set_active(&mut self, id: ObjectId) {
        self.insert(id);
    }

    pub fn select_placeholder(&mut self, id: ObjectId) {
        self.ids.clear();
        self.active = None;
        self.nodes.clear();
        self.placeholder = Some(id);
    }

    pub fn set_nodes(&mut self, nodes: Vec<String>) {
        self.nodes = nodes;
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.active = None;
        self.placeholder = None;
        self.nodes.clear();
    }
}

/// Hit testing over the board, with candidate counts tracked for profiling.
#[derive(Debug, Default)]
pub struct SelectionEngine {
    profiler: HitTestProfiler,
}

impl SelectionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn profiler(&self) -> &HitTestProfiler {
        &self.profiler
    }

    /// Topmost placeholder or object under `point`.
    ///
    /// Placeholders render above objects and are checked first. Paths are
    /// tested against their stroke by the scene, everything else by bounds.
    pub fn hit_test<S: SceneGraph>(
        &mut self,
        board: &Board,
        scene: &S,
        point: Point,
        zoom: f64,
        config: &SelectionConfig,
    ) -> Option<HitTarget> {
        profile_scope!("hit_test");
        if let Some(p) = board.placeholder_at(point) {
            return Some(HitTarget::Placeholder(p.id));
        }

        let tolerance = config.path_hit_tolerance_px / zoom;
        let probe = Bounds::new(point.x, point.y, 0.0, 0.0).inflate(tolerance);
        let ((hit, tested), elapsed_ms) = measure(|| {
            let candidates = board.objects_in_rect(&probe);
            let tested = candidates.len();
            let hit = candidates.into_iter().rev().find(|object| {
                if !object.visible {
                    return false;
                }
                if object.is_path() {
                    scene.hit_test_path(object, point, tolerance)
                } else {
                    object.bounds.contains(point)
                }
            });
            (hit.map(|o| o.id), tested)
        });
        self.profiler.record(tested, elapsed_ms);
        hit.map(HitTarget::Object)
    }

    /// Resize handle of a selected object under `point`, if any.
    ///
    /// The active object wins when handles of several selected objects overlap.
    pub fn hit_test_handle(
        &self,
        board: &Board,
        selection: &SelectionSet,
        point: Point,
        zoom: f64,
        config: &SelectionConfig,
    ) -> Option<(ObjectId, ResizeHandle)> {
        let radius = config.handle_radius_px / zoom;
        let ordered = selection
            .active()
            .into_iter()
            .chain(selection.ids().iter().rev().copied().filter(|id| Some(*id) != selection.active()));

        for id in ordered {
            let Some(object) = board.object(id) else {
                continue;
            };
            for handle in ResizeHandle::ALL {
                if handle.corner(&object.bounds).distance(point) <= radius {
                    return Some((id, handle));
                }
            }
        }
        None
    }

    /// Objects of enabled kinds whose bounds touch `rect`, bottom to top,
    /// plus any node-graph entries when that layer is enabled.
    pub fn box_select(
        &mut self,
        board: &Board,
        rect: &Bounds,
        config: &SelectionConfig,
        nodes: Option<&dyn NodeGraphLayer>,
    ) -> (Vec<ObjectId>, Vec<String>) {
        profile_scope!("box_select");
        let (ids, elapsed_ms) = measure(|| {
            board
                .objects_in_rect(rect)
                .into_iter()
                .filter(|o| o.visible && config.includes(o.kind) && o.bounds.intersects(rect))
                .map(|o| o.id)
                .collect::<Vec<_>>()
        });
        self.profiler.record(ids.len(), elapsed_ms);

        let node_ids = match (config.include_nodes, nodes) {
            (true, Some(layer)) => layer.nodes_in_rect(rect),
            _ => Vec::new(),
        };
        (ids, node_ids)
    }

    /// Make the scene and the `selected` flags agree with `selection`.
    ///
    /// `previous` is the id list before the change; objects that left the
    /// selection get their helpers hidden.
    pub fn sync_visuals<S: SceneGraph>(board: &mut Board, scene: &mut S, previous: &[ObjectId], selection: &SelectionSet) {
        let now: HashSet<ObjectId> = selection.ids().iter().copied().collect();

        for id in previous.iter().filter(|id| !now.contains(id)) {
            if let Some(object) = board.object_mut(*id) {
                object.selected = false;
                scene.set_helpers_visible(*id, false);
            }
        }

        for id in selection.ids() {
            let Some(object) = board.object_mut(*id) else {
                continue;
            };
            object.selected = true;
            let geometry = HelperGeometry::for_bounds(object.bounds);
            scene.sync_helpers(*id, &geometry);
            scene.set_helpers_visible(*id, true);
        }
    }
}
