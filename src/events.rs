//! Typed notifications published by the engine.
//!
//! Handlers run synchronously on the publishing thread, in no particular
//! order relative to each other. A handler must not subscribe or unsubscribe
//! from inside its own callback.

use crate::error::FailureReason;
use crate::geometry::{Bounds, Point};
use crate::input::cursor::CursorStyle;
use crate::types::{ObjectId, ObjectKind};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use uuid::Uuid;

/// Everything the engine reports to the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    ObjectMoved { id: ObjectId, bounds: Bounds },
    ObjectResized { id: ObjectId, bounds: Bounds },
    SelectionChanged {
        ids: Vec<ObjectId>,
        active: Option<ObjectId>,
        /// Selected entries of the external node-graph layer
        nodes: Vec<String>,
    },
    PlacementProgress { id: ObjectId, progress: f32 },
    PlacementResolved { id: ObjectId, kind: ObjectKind, bounds: Bounds },
    PlacementFailed { id: ObjectId, reason: FailureReason },
    ObjectAdded { id: ObjectId, kind: ObjectKind, bounds: Bounds },
    ObjectsDeleted { ids: Vec<ObjectId> },
    /// A resolved object received a later, higher fidelity load
    ContentUpgraded { id: ObjectId, bounds: Bounds },
    /// The user clicked an empty upload slot; the host should open a file picker
    UploadRequested { id: ObjectId },
    TextEditStarted { id: ObjectId },
    TextEditEnded { id: ObjectId, committed: bool },
    CursorChanged { cursor: CursorStyle },
    ViewportChanged { zoom: f64, pan: Point },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EventCategory {
    Object,
    Selection,
    Placement,
    Interaction,
    View,
}

impl EngineEvent {
    pub fn category(&self) -> EventCategory {
        match self {
            EngineEvent::ObjectMoved { .. }
            | EngineEvent::ObjectResized { .. }
            | EngineEvent::ObjectAdded { .. }
            | EngineEvent::ObjectsDeleted { .. }
            | EngineEvent::ContentUpgraded { .. } => EventCategory::Object,
            EngineEvent::SelectionChanged { .. } => EventCategory::Selection,
            EngineEvent::PlacementProgress { .. }
            | EngineEvent::PlacementResolved { .. }
            | EngineEvent::PlacementFailed { .. } => EventCategory::Placement,
            EngineEvent::UploadRequested { .. }
            | EngineEvent::TextEditStarted { .. }
            | EngineEvent::TextEditEnded { .. }
            | EngineEvent::CursorChanged { .. } => EventCategory::Interaction,
            EngineEvent::ViewportChanged { .. } => EventCategory::View,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EngineEvent::ObjectMoved { .. } => "object_moved",
            EngineEvent::ObjectResized { .. } => "object_resized",
            EngineEvent::SelectionChanged { .. } => "selection_changed",
            EngineEvent::PlacementProgress { .. } => "placement_progress",
            EngineEvent::PlacementResolved { .. } => "placement_resolved",
            EngineEvent::PlacementFailed { .. } => "placement_failed",
            EngineEvent::ObjectAdded { .. } => "object_added",
            EngineEvent::ObjectsDeleted { .. } => "objects_deleted",
            EngineEvent::ContentUpgraded { .. } => "content_upgraded",
            EngineEvent::UploadRequested { .. } => "upload_requested",
            EngineEvent::TextEditStarted { .. } => "text_edit_started",
            EngineEvent::TextEditEnded { .. } => "text_edit_ended",
            EngineEvent::CursorChanged { .. } => "cursor_changed",
            EngineEvent::ViewportChanged { .. } => "viewport_changed",
        }
    }
}

/// Subscription handle for unsubscribing from events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", &self.0.to_string()[..8])
    }
}

#[derive(Debug, Clone, Default)]
pub enum EventFilter {
    #[default]
    All,
    /// Receive events matching any of these categories.
    Categories(Vec<EventCategory>),
}

impl EventFilter {
    pub fn matches(&self, event: &EngineEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Categories(categories) => categories.contains(&event.category()),
        }
    }
}

type EventHandler = Box<dyn Fn(&EngineEvent) + Send + Sync>;

/// Synchronous publish/subscribe bus.
#[derive(Default)]
pub struct EventBus {
    handlers: RwLock<HashMap<SubscriptionId, (EventFilter, EventHandler)>>,
    history: RwLock<VecDeque<EngineEvent>>,
    /// Zero disables history
    history_capacity: usize,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bus that keeps the last `capacity` events for inspection.
    pub fn with_history(capacity: usize) -> Self {
        Self {
            history_capacity: capacity,
            ..Self::default()
        }
    }

    /// Publish an event to all matching subscribers.
    ///
    /// Returns the number of handlers that received it.
    pub fn publish(&self, event: EngineEvent) -> usize {
        if self.history_capacity > 0 {
            let mut history = self.history.write();
            if history.len() >= self.history_capacity {
                history.pop_front();
            }
            history.push_back(event.clone());
        }

        let handlers = self.handlers.read();
        let mut delivered = 0;
        for (filter, handler) in handlers.values() {
            if filter.matches(&event) {
                handler(&event);
                delivered += 1;
            }
        }
        delivered
    }

    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: Fn(&EngineEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId::new();
        self.handlers.write().insert(id, (filter, Box::new(handler)));
        tracing::debug!("Subscription {} added", id);
        id
    }

    /// Returns true if the subscription was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.handlers.write().remove(&id).is_some();
        if removed {
            tracing::debug!("Subscription {} removed", id);
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.read().len()
    }

    pub fn history(&self) -> Vec<EngineEvent> {
        self.history.read().iter().cloned().collect()
    }

    pub fn clear_history(&self) {
        self.history.write().clear();
    }
}
