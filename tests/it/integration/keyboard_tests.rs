//! Keyboard shortcuts, deletion and in-place text editing.

use crate::helpers::{EventRecorder, TestEngineBuilder, click, drag};
use genboard::events::EngineEvent;
use genboard::geometry::{Bounds, Point};
use genboard::input::InputState;
use genboard::types::{ContentRef, ObjectKind, ToolMode};
use genboard::{KeyEvent, Modifiers};

fn key(name: &str) -> KeyEvent {
    KeyEvent::new(name)
}

fn cmd(name: &str) -> KeyEvent {
    KeyEvent::new(name).with_modifiers(Modifiers::CTRL)
}

#[test]
fn test_delete_key_removes_selection_in_one_step() {
    let (mut engine, ids) = TestEngineBuilder::new()
        .with_image(Bounds::new(0.0, 0.0, 100.0, 100.0))
        .with_image(Bounds::new(200.0, 0.0, 100.0, 100.0))
        .with_image(Bounds::new(400.0, 0.0, 100.0, 100.0))
        .build();
    let recorder = EventRecorder::attach(&engine);
    engine.set_selection(vec![ids[0], ids[2]]);
    let commits_before = engine.history().total_commits();

    assert!(engine.handle_key_down(&key("Delete")));

    assert_eq!(engine.board().object_ids(), vec![ids[1]]);
    assert!(engine.selection().is_empty());
    assert_eq!(engine.history().total_commits(), commits_before + 1);
    assert_eq!(recorder.count("objects_deleted"), 1);
    assert!(recorder.all().iter().any(
        |e| matches!(e, EngineEvent::ObjectsDeleted { ids: gone } if gone == &vec![ids[0], ids[2]])
    ));
    assert_eq!(engine.scene().rendered_bounds(ids[0]), None);
}

#[test]
fn test_backspace_cancels_selected_placeholder() {
    let (mut engine, _) = TestEngineBuilder::new().build();
    let recorder = EventRecorder::attach(&engine);
    engine.set_tool(ToolMode::PlaceModel);
    click(&mut engine, 300.0, 300.0);
    let slot = engine.selection().placeholder().unwrap();
    assert_eq!(engine.board().placeholder(slot).unwrap().kind, ObjectKind::Model);

    assert!(engine.handle_key_down(&key("Backspace")));

    assert!(engine.board().placeholders().is_empty());
    assert!(!engine.scene().has_placeholder(slot));
    assert!(engine.selection().placeholder().is_none());
    assert!(engine.registry().get(slot).is_none_or(|r| r.status.is_terminal()));
    assert!(recorder
        .all()
        .iter()
        .any(|e| matches!(e, EngineEvent::ObjectsDeleted { ids } if ids == &vec![slot])));
}

#[test]
fn test_delete_with_nothing_selected_is_a_no_op() {
    let (mut engine, _) = TestEngineBuilder::new()
        .with_image(Bounds::new(0.0, 0.0, 100.0, 100.0))
        .build();
    let commits_before = engine.history().total_commits();
    assert!(engine.handle_key_down(&key("Delete")));
    assert_eq!(engine.board().len(), 1);
    assert_eq!(engine.history().total_commits(), commits_before);
}

#[test]
fn test_select_all() {
    let (mut engine, ids) = TestEngineBuilder::new()
        .with_image(Bounds::new(0.0, 0.0, 100.0, 100.0))
        .with_image(Bounds::new(200.0, 0.0, 100.0, 100.0))
        .build();
    assert!(engine.handle_key_down(&cmd("a")));
    assert_eq!(engine.selection().ids(), ids.as_slice());
    assert_eq!(engine.selection().active(), Some(ids[1]));
}

#[test]
fn test_tool_keys_only_switch_when_idle() {
    let (mut engine, _) = TestEngineBuilder::new()
        .with_image(Bounds::new(0.0, 0.0, 100.0, 100.0))
        .build();

    assert!(engine.handle_key_down(&key("r")));
    assert_eq!(engine.tool(), ToolMode::DrawRect);
    assert!(engine.handle_key_down(&key("v")));
    assert_eq!(engine.tool(), ToolMode::Select);

    engine.pointer_down(&genboard::PointerEvent::new(50.0, 50.0));
    assert!(!engine.handle_key_down(&key("o")));
    assert_eq!(engine.tool(), ToolMode::Select);
    engine.pointer_up(&genboard::PointerEvent::new(50.0, 50.0));

    assert!(!engine.handle_key_down(&key("q")));
}

#[test]
fn test_zoom_keys_keep_viewport_centre() {
    let (mut engine, _) = TestEngineBuilder::new().build();
    let centre = engine.view().viewport_center();

    assert!(engine.handle_key_down(&cmd("=")));
    assert!((engine.view().zoom() - 1.2).abs() < 1e-9);
    let after = engine.view().viewport_center();
    assert!((after.x - centre.x).abs() < 1e-9 && (after.y - centre.y).abs() < 1e-9);

    assert!(engine.handle_key_down(&cmd("=")));
    assert!(engine.handle_key_down(&cmd("-")));
    assert!((engine.view().zoom() - 1.2).abs() < 1e-9);

    assert!(engine.handle_key_down(&cmd("0")));
    assert!((engine.view().zoom() - 1.0).abs() < 1e-9);
}

#[test]
fn test_escape_cancels_running_drag() {
    let (mut engine, ids) = TestEngineBuilder::new()
        .with_image(Bounds::new(0.0, 0.0, 100.0, 100.0))
        .build();
    engine.pointer_down(&genboard::PointerEvent::new(50.0, 50.0));
    engine.pointer_move(&genboard::PointerEvent::new(120.0, 50.0));
    assert!(matches!(engine.input_state(), InputState::DraggingObjects(_)));

    assert!(engine.handle_key_down(&key("Escape")));
    assert!(engine.input_state().is_idle());
    assert_eq!(engine.scene().rendered_bounds(ids[0]), Some(Bounds::new(0.0, 0.0, 100.0, 100.0)));

    // Releasing afterwards does nothing
    let commits = engine.history().total_commits();
    engine.pointer_up(&genboard::PointerEvent::new(120.0, 50.0));
    assert_eq!(engine.history().total_commits(), commits);
}

#[test]
fn test_escape_drops_line_anchor() {
    let (mut engine, _) = TestEngineBuilder::new().build();
    engine.set_tool(ToolMode::DrawLine);
    click(&mut engine, 10.0, 10.0);
    engine.handle_key_down(&key("Escape"));
    click(&mut engine, 300.0, 300.0);
    assert!(engine.board().is_empty());
}

#[test]
fn test_text_tool_commit() {
    let (mut engine, _) = TestEngineBuilder::new().build();
    let recorder = EventRecorder::attach(&engine);
    engine.set_tool(ToolMode::Text);

    click(&mut engine, 300.0, 300.0);
    let id = engine.text_editing().unwrap();
    let object = engine.board().object(id).unwrap();
    assert_eq!(object.kind, ObjectKind::Text);
    assert_eq!(object.bounds.origin(), Point::new(300.0, 300.0));
    assert!(engine.selection().contains(id));
    assert_eq!(recorder.count("text_edit_started"), 1);

    // Keys belong to the text field while editing
    assert!(!engine.handle_key_down(&key("Delete")));
    assert!(engine.board().contains_object(id));

    assert!(engine.commit_text("hello"));
    assert_eq!(engine.text_editing(), None);
    assert_eq!(
        engine.board().object(id).unwrap().content,
        ContentRef::Text("hello".to_string())
    );
    assert!(recorder
        .all()
        .iter()
        .any(|e| matches!(e, EngineEvent::TextEditEnded { committed: true, .. })));
    assert_eq!(engine.history().labels(), vec!["edit text"]);
    assert!(!engine.commit_text("again"));
}

#[test]
fn test_escape_discards_empty_text_object() {
    let (mut engine, _) = TestEngineBuilder::new().build();
    engine.set_tool(ToolMode::Text);
    click(&mut engine, 300.0, 300.0);
    let id = engine.text_editing().unwrap();

    assert!(engine.handle_key_down(&key("Escape")));
    assert_eq!(engine.text_editing(), None);
    assert!(!engine.board().contains_object(id));
    assert!(engine.selection().is_empty());
    assert!(engine.history().is_empty());
}

#[test]
fn test_blank_commit_and_click_away_discard_text() {
    let (mut engine, _) = TestEngineBuilder::new().build();
    engine.set_tool(ToolMode::Text);

    click(&mut engine, 300.0, 300.0);
    let first = engine.text_editing().unwrap();
    assert!(engine.commit_text("   "));
    assert!(!engine.board().contains_object(first));

    click(&mut engine, 300.0, 300.0);
    let second = engine.text_editing().unwrap();
    // Clicking elsewhere ends the edit, then starts a new text object
    click(&mut engine, 900.0, 100.0);
    assert!(!engine.board().contains_object(second));
    assert_eq!(engine.board().len(), 1);
}

#[test]
fn test_space_pan_cursor_round_trip() {
    let (mut engine, _) = TestEngineBuilder::new().build();
    assert!(engine.handle_key_down(&key(" ")));
    drag(&mut engine, (100.0, 100.0), &[(150.0, 80.0)]);
    assert_eq!(engine.view().pan(), Point::new(50.0, -20.0));

    assert!(engine.handle_key_up(&key(" ")));
    assert!(!engine.handle_key_up(&key(" ")));
    assert_eq!(engine.cursor(), genboard::input::cursor::CursorStyle::Default);
}
