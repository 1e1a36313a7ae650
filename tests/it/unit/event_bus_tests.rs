//! Unit tests for the event bus as seen through the engine.

use crate::helpers::{EventRecorder, TestEngineBuilder};
use genboard::events::{EngineEvent, EventBus, EventCategory, EventFilter};
use genboard::geometry::{Bounds, Point};
use genboard::types::ObjectId;
use parking_lot::Mutex;
use std::sync::Arc;

#[test]
fn test_category_filter_only_delivers_matching_events() {
    let bus = EventBus::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    bus.subscribe(EventFilter::Categories(vec![EventCategory::View]), move |e| {
        sink.lock().push(e.name());
    });

    bus.publish(EngineEvent::ObjectsDeleted { ids: vec![] });
    let delivered = bus.publish(EngineEvent::ViewportChanged {
        zoom: 2.0,
        pan: Point::new(0.0, 0.0),
    });

    assert_eq!(delivered, 1);
    assert_eq!(*seen.lock(), vec!["viewport_changed"]);
}

#[test]
fn test_unsubscribe_stops_delivery() {
    let bus = EventBus::new();
    let count = Arc::new(Mutex::new(0usize));
    let sink = count.clone();
    let sub = bus.subscribe(EventFilter::All, move |_| *sink.lock() += 1);

    bus.publish(EngineEvent::UploadRequested { id: ObjectId::new() });
    assert!(bus.unsubscribe(sub));
    assert!(!bus.unsubscribe(sub));
    bus.publish(EngineEvent::UploadRequested { id: ObjectId::new() });

    assert_eq!(*count.lock(), 1);
    assert_eq!(bus.subscriber_count(), 0);
}

#[test]
fn test_history_is_bounded() {
    let bus = EventBus::with_history(2);
    for _ in 0..5 {
        bus.publish(EngineEvent::ObjectMoved {
            id: ObjectId::new(),
            bounds: Bounds::new(0.0, 0.0, 50.0, 50.0),
        });
    }
    assert_eq!(bus.history().len(), 2);
    bus.clear_history();
    assert!(bus.history().is_empty());
}

#[test]
fn test_engine_publishes_view_changes() {
    let (mut engine, _) = TestEngineBuilder::new().build();
    let recorder = EventRecorder::attach(&engine);

    engine.zoom_at(2.0, Point::new(100.0, 100.0));
    engine.pan_by(Point::new(10.0, 0.0));

    assert_eq!(recorder.count("viewport_changed"), 2);
    assert_eq!(engine.view().zoom(), 2.0);
}
