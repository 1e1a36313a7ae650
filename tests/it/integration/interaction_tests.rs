//! Pointer gestures end to end: select, drag, resize, box select, draw, pan.

use crate::helpers::{EventRecorder, TestEngineBuilder, bounds_of, click, drag};
use genboard::events::EngineEvent;
use genboard::geometry::{Bounds, Point};
use genboard::input::cursor::CursorStyle;
use genboard::input::{Modifiers, PointerButton, PointerEvent};
use genboard::types::{ContentRef, ObjectKind, PathShape, ToolMode};

fn two_images() -> (crate::helpers::TestEngine, genboard::ObjectId, genboard::ObjectId) {
    let (engine, ids) = TestEngineBuilder::new()
        .with_image(Bounds::new(0.0, 0.0, 100.0, 100.0))
        .with_image(Bounds::new(200.0, 0.0, 100.0, 100.0))
        .build();
    (engine, ids[0], ids[1])
}

#[test]
fn test_group_drag_moves_every_member_with_one_checkpoint() {
    let (mut engine, a, b) = two_images();
    let recorder = EventRecorder::attach(&engine);
    engine.set_selection(vec![a, b]);
    let commits_before = engine.history().total_commits();

    drag(&mut engine, (50.0, 50.0), &[(52.0, 50.0), (80.0, 90.0), (110.0, 130.0)]);

    assert_eq!(bounds_of(&engine, a), Bounds::new(60.0, 80.0, 100.0, 100.0));
    assert_eq!(bounds_of(&engine, b), Bounds::new(260.0, 80.0, 100.0, 100.0));
    assert_eq!(engine.history().total_commits(), commits_before + 1);
    assert_eq!(engine.history().last().unwrap().label, "move");
    assert_eq!(recorder.count("object_moved"), 2);
    assert!(engine.input_state().is_idle());

    // Board, index and scene agree after release
    assert_eq!(engine.scene().rendered_bounds(a), Some(bounds_of(&engine, a)));
    assert_eq!(engine.board().spatial_index().get(b), Some(bounds_of(&engine, b)));
}

#[test]
fn test_drag_writes_are_coalesced_per_frame() {
    let (mut engine, a, _) = two_images();
    engine.pointer_down(&PointerEvent::new(50.0, 50.0));
    for x in [60.0, 70.0, 80.0, 90.0] {
        engine.pointer_move(&PointerEvent::new(x, 50.0));
    }
    assert_eq!(engine.scene().frame_requests(), 1);
    // The board does not move until the gesture commits
    assert_eq!(bounds_of(&engine, a), Bounds::new(0.0, 0.0, 100.0, 100.0));

    engine.on_animation_frame();
    assert_eq!(engine.scene().rendered_bounds(a), Some(Bounds::new(40.0, 0.0, 100.0, 100.0)));

    engine.pointer_move(&PointerEvent::new(95.0, 50.0));
    assert_eq!(engine.scene().frame_requests(), 2);

    let stats = engine.frame_stats();
    assert_eq!(stats.frames_flushed, 1);
    assert_eq!(stats.writes_coalesced, 3);
    engine.pointer_up(&PointerEvent::new(95.0, 50.0));
}

#[test]
fn test_click_without_moving_commits_nothing() {
    let (mut engine, a, b) = two_images();
    engine.set_selection(vec![a, b]);
    let commits_before = engine.history().total_commits();

    click(&mut engine, 51.0, 51.0);

    assert_eq!(engine.history().total_commits(), commits_before);
    // Clicking a member of a multi-selection keeps the group
    assert_eq!(engine.selection().len(), 2);
}

#[test]
fn test_plain_click_replaces_and_ctrl_click_toggles() {
    let (mut engine, a, b) = two_images();

    click(&mut engine, 50.0, 50.0);
    assert_eq!(engine.selection().ids(), &[a]);

    click(&mut engine, 250.0, 50.0);
    assert_eq!(engine.selection().ids(), &[b]);

    let ctrl_click = PointerEvent::new(50.0, 50.0).with_modifiers(Modifiers::CTRL);
    engine.pointer_down(&ctrl_click);
    engine.pointer_up(&ctrl_click);
    assert_eq!(engine.selection().ids(), &[b, a]);
    assert!(engine.scene().helpers_visible(a));

    engine.pointer_down(&ctrl_click);
    engine.pointer_up(&ctrl_click);
    assert_eq!(engine.selection().ids(), &[b]);
    assert!(!engine.scene().helpers_visible(a));
}

#[test]
fn test_box_select_from_empty_space() {
    let (mut engine, ids) = TestEngineBuilder::new()
        .with_image(Bounds::new(10.0, 10.0, 50.0, 50.0))
        .with_image(Bounds::new(300.0, 300.0, 50.0, 50.0))
        .build();
    engine.set_selection(vec![ids[1]]);

    drag(&mut engine, (0.0, 0.0), &[(100.0, 100.0), (200.0, 200.0)]);

    assert_eq!(engine.selection().ids(), &[ids[0]]);
    assert!(engine.board().object(ids[0]).unwrap().selected);
    assert!(!engine.board().object(ids[1]).unwrap().selected);
}

#[test]
fn test_tiny_marquee_only_clears_selection() {
    let (mut engine, a, _) = two_images();
    engine.set_selection(vec![a]);
    drag(&mut engine, (150.0, 150.0), &[(152.0, 151.0)]);
    assert!(engine.selection().is_empty());
}

#[test]
fn test_delete_during_drag_is_deferred() {
    let (mut engine, a, b) = two_images();
    let recorder = EventRecorder::attach(&engine);
    engine.set_selection(vec![a]);

    engine.pointer_down(&PointerEvent::new(50.0, 50.0));
    engine.pointer_move(&PointerEvent::new(70.0, 50.0));
    engine.delete_objects(vec![b]);
    assert!(engine.board().contains_object(b));

    engine.pointer_up(&PointerEvent::new(70.0, 50.0));
    assert!(!engine.board().contains_object(b));
    assert_eq!(bounds_of(&engine, a).x, 20.0);
    assert_eq!(engine.history().labels().last(), Some(&"delete"));
    assert!(recorder
        .all()
        .iter()
        .any(|e| matches!(e, EngineEvent::ObjectsDeleted { ids } if ids == &vec![b])));
}

#[test]
fn test_pointer_leave_cancels_drag() {
    let (mut engine, a, _) = two_images();
    let commits_before = engine.history().total_commits();

    engine.pointer_down(&PointerEvent::new(50.0, 50.0));
    engine.pointer_move(&PointerEvent::new(90.0, 90.0));
    engine.on_animation_frame();
    assert_eq!(engine.scene().rendered_bounds(a), Some(Bounds::new(40.0, 40.0, 100.0, 100.0)));

    engine.pointer_leave();
    assert!(engine.input_state().is_idle());
    assert_eq!(engine.scene().rendered_bounds(a), Some(Bounds::new(0.0, 0.0, 100.0, 100.0)));
    assert_eq!(bounds_of(&engine, a), Bounds::new(0.0, 0.0, 100.0, 100.0));
    assert_eq!(engine.history().total_commits(), commits_before);
}

#[test]
fn test_corner_resize_keeps_aspect_ratio() {
    let (mut engine, ids) = TestEngineBuilder::new()
        .with_image(Bounds::new(0.0, 0.0, 200.0, 100.0))
        .build();
    let id = ids[0];
    engine.set_selection(vec![id]);
    let recorder = EventRecorder::attach(&engine);

    engine.pointer_down(&PointerEvent::new(200.0, 100.0));
    assert!(engine.input_state().is_resizing());
    assert_eq!(engine.cursor(), CursorStyle::ResizeNwse);
    engine.pointer_move(&PointerEvent::new(260.0, 140.0));
    engine.pointer_up(&PointerEvent::new(260.0, 140.0));

    let b = bounds_of(&engine, id);
    assert_eq!(b.origin(), Point::new(0.0, 0.0));
    assert!((b.width / b.height - 2.0).abs() < 1e-9);
    assert!((b.width - 264.0).abs() < 1e-9);
    assert_eq!(recorder.count("object_resized"), 1);
    assert_eq!(engine.history().last().unwrap().label, "resize");
    assert_eq!(engine.scene().helpers(id).unwrap().border, b);
}

#[test]
fn test_shift_resize_is_free() {
    let (mut engine, ids) = TestEngineBuilder::new()
        .with_image(Bounds::new(0.0, 0.0, 200.0, 100.0))
        .build();
    engine.set_selection(vec![ids[0]]);

    let shift = Modifiers::SHIFT;
    engine.pointer_down(&PointerEvent::new(200.0, 100.0));
    engine.pointer_move(&PointerEvent::new(230.0, 300.0).with_modifiers(shift));
    engine.pointer_up(&PointerEvent::new(230.0, 300.0).with_modifiers(shift));

    assert_eq!(bounds_of(&engine, ids[0]), Bounds::new(0.0, 0.0, 230.0, 300.0));
}

#[test]
fn test_draw_rect_and_discard_tiny_shapes() {
    let (mut engine, _) = TestEngineBuilder::new().build();
    engine.set_tool(ToolMode::DrawRect);

    drag(&mut engine, (400.0, 400.0), &[(405.0, 403.0)]);
    assert!(engine.board().is_empty());

    drag(&mut engine, (400.0, 400.0), &[(450.0, 430.0), (500.0, 460.0)]);
    assert_eq!(engine.board().len(), 1);
    let object = &engine.board().objects()[0];
    assert_eq!(object.kind, ObjectKind::Path);
    assert_eq!(object.bounds, Bounds::new(400.0, 400.0, 100.0, 60.0));
    assert_eq!(object.content, ContentRef::Shape(PathShape::Rect));
    assert!(engine.selection().contains(object.id));
    assert_eq!(engine.history().labels(), vec!["draw"]);
}

#[test]
fn test_line_by_drag_and_by_two_clicks() {
    let (mut engine, _) = TestEngineBuilder::new().build();
    engine.set_tool(ToolMode::DrawLine);

    drag(&mut engine, (100.0, 500.0), &[(300.0, 520.0)]);
    let dragged = engine.board().objects()[0].clone();
    assert_eq!(dragged.bounds, Bounds::new(100.0, 500.0, 200.0, 50.0));
    assert_eq!(
        dragged.content,
        ContentRef::Shape(PathShape::Line {
            start: Point::new(0.0, 0.0),
            end: Point::new(200.0, 20.0),
        })
    );

    // First click anchors, second click completes
    click(&mut engine, 600.0, 100.0);
    assert_eq!(engine.board().len(), 1);
    click(&mut engine, 400.0, 300.0);
    assert_eq!(engine.board().len(), 2);

    let clicked = &engine.board().objects()[1];
    assert_eq!(clicked.bounds, Bounds::new(400.0, 100.0, 200.0, 200.0));
    assert_eq!(
        clicked.content,
        ContentRef::Shape(PathShape::Line {
            start: Point::new(200.0, 0.0),
            end: Point::new(0.0, 200.0),
        })
    );
}

#[test]
fn test_switching_tool_drops_line_anchor() {
    let (mut engine, _) = TestEngineBuilder::new().build();
    engine.set_tool(ToolMode::DrawLine);
    click(&mut engine, 10.0, 10.0);
    engine.set_tool(ToolMode::Select);
    engine.set_tool(ToolMode::DrawLine);
    click(&mut engine, 300.0, 300.0);
    assert!(engine.board().is_empty());
}

#[test]
fn test_upload_slot_requests_file() {
    let (mut engine, _) = TestEngineBuilder::new().build();
    let recorder = EventRecorder::attach(&engine);
    engine.set_tool(ToolMode::PlaceImage);

    click(&mut engine, 600.0, 600.0);
    let slot = engine.board().placeholders()[0].clone();
    assert!(slot.awaiting_upload);
    assert_eq!(slot.bounds.center(), Point::new(600.0, 600.0));
    assert_eq!(engine.selection().placeholder(), Some(slot.id));

    click(&mut engine, 600.0, 600.0);
    assert!(recorder
        .all()
        .iter()
        .any(|e| matches!(e, EngineEvent::UploadRequested { id } if *id == slot.id)));
    assert_eq!(engine.board().placeholders().len(), 1);
}

#[test]
fn test_middle_button_and_space_pan() {
    let (mut engine, a, _) = two_images();

    let middle = |x, y| PointerEvent::new(x, y).with_button(PointerButton::Middle);
    engine.pointer_down(&middle(500.0, 500.0));
    engine.pointer_move(&middle(530.0, 520.0));
    engine.pointer_up(&middle(530.0, 520.0));
    assert_eq!(engine.view().pan(), Point::new(30.0, 20.0));

    // Space held over an object pans instead of moving it
    assert!(engine.handle_key_down(&genboard::KeyEvent::new(" ")));
    assert_eq!(engine.cursor(), CursorStyle::Grab);
    let on_a = engine.view().to_screen_space(Point::new(50.0, 50.0));
    drag(&mut engine, (on_a.x, on_a.y), &[(on_a.x + 10.0, on_a.y)]);
    assert_eq!(engine.view().pan(), Point::new(40.0, 20.0));
    assert_eq!(bounds_of(&engine, a), Bounds::new(0.0, 0.0, 100.0, 100.0));
    assert!(engine.handle_key_up(&genboard::KeyEvent::new(" ")));
}

#[test]
fn test_pan_respects_device_pixel_ratio() {
    let (mut engine, _) = TestEngineBuilder::new().with_dpr(2.0).build();
    engine.set_tool(ToolMode::Pan);
    drag(&mut engine, (100.0, 100.0), &[(160.0, 140.0)]);
    assert_eq!(engine.view().pan(), Point::new(30.0, 20.0));
}

#[test]
fn test_wheel_scrolls_and_zooms() {
    let (mut engine, _) = TestEngineBuilder::new().build();
    engine.handle_wheel(Point::new(0.0, 100.0), Point::new(400.0, 300.0), Modifiers::NONE);
    assert_eq!(engine.view().pan(), Point::new(0.0, -100.0));

    let anchor = engine.view().to_canvas_space(Point::new(400.0, 300.0));
    engine.handle_wheel(Point::new(0.0, 100.0), Point::new(400.0, 300.0), Modifiers::CTRL);
    assert!((engine.view().zoom() - 0.8).abs() < 1e-9);
    let after = engine.view().to_canvas_space(Point::new(400.0, 300.0));
    assert!((anchor.x - after.x).abs() < 1e-9 && (anchor.y - after.y).abs() < 1e-9);
}

#[test]
fn test_hover_cursor_affordance() {
    let (mut engine, a, _) = two_images();
    engine.pointer_move(&PointerEvent::new(50.0, 50.0));
    assert_eq!(engine.cursor(), CursorStyle::Default);

    engine.set_selection(vec![a]);
    engine.pointer_move(&PointerEvent::new(50.0, 50.0));
    assert_eq!(engine.cursor(), CursorStyle::Move);

    engine.pointer_move(&PointerEvent::new(100.0, 0.0));
    assert_eq!(engine.cursor(), CursorStyle::ResizeNesw);

    engine.set_tool(ToolMode::DrawEllipse);
    assert_eq!(engine.cursor(), CursorStyle::Crosshair);
}

#[test]
fn test_zoomed_view_hit_testing() {
    let (mut engine, ids) = TestEngineBuilder::new()
        .with_zoom(2.0)
        .with_pan(100.0, 50.0)
        .with_image(Bounds::new(0.0, 0.0, 100.0, 100.0))
        .build();
    // Canvas (50, 50) is screen (200, 150) at zoom 2, pan (100, 50)
    click(&mut engine, 200.0, 150.0);
    assert_eq!(engine.selection().ids(), &[ids[0]]);
}

#[test]
fn test_pressed_object_comes_to_front() {
    let (mut engine, a, b) = two_images();
    assert_eq!(engine.board().z_index(a), Some(0));

    click(&mut engine, 50.0, 50.0);

    assert_eq!(engine.board().z_index(a), Some(1));
    assert_eq!(engine.board().z_index(b), Some(0));
    assert!(engine
        .scene()
        .commands()
        .iter()
        .any(|c| matches!(c, genboard::scene::SceneCommand::BringToFront { id } if *id == a)));
}

#[test]
fn test_cancelled_resize_restores_start_bounds() {
    let (mut engine, ids) = TestEngineBuilder::new()
        .with_image(Bounds::new(0.0, 0.0, 200.0, 100.0))
        .build();
    let id = ids[0];
    let start = Bounds::new(0.0, 0.0, 200.0, 100.0);
    engine.set_selection(vec![id]);
    let recorder = EventRecorder::attach(&engine);
    let commits_before = engine.history().total_commits();

    let cancels: [fn(&mut crate::helpers::TestEngine); 2] = [
        |e| e.pointer_leave(),
        |e| {
            e.handle_key_down(&genboard::KeyEvent::new("Escape"));
        },
    ];
    for cancel in cancels {
        engine.pointer_down(&PointerEvent::new(200.0, 100.0));
        engine.pointer_move(&PointerEvent::new(400.0, 200.0));
        engine.on_animation_frame();
        assert_ne!(engine.scene().rendered_bounds(id), Some(start));

        cancel(&mut engine);

        assert!(engine.input_state().is_idle());
        assert_eq!(engine.scene().rendered_bounds(id), Some(start));
        assert_eq!(engine.scene().helpers(id).unwrap().border, start);
        assert_eq!(bounds_of(&engine, id), start);
    }
    assert_eq!(engine.history().total_commits(), commits_before);
    assert_eq!(recorder.count("object_resized"), 0);
}

#[test]
fn test_active_object_can_be_set_explicitly() {
    let (mut engine, a, b) = two_images();
    engine.set_selection(vec![a, b]);
    assert_eq!(engine.selection().active(), Some(b));
    let recorder = EventRecorder::attach(&engine);

    engine.set_active_object(a);
    assert_eq!(engine.selection().active(), Some(a));
    assert_eq!(engine.selection().ids(), &[a, b]);
    assert!(recorder.all().iter().any(|e| matches!(
        e,
        EngineEvent::SelectionChanged { active: Some(active), .. } if *active == a
    )));

    engine.set_active_object(genboard::ObjectId::new());
    assert_eq!(engine.selection().active(), Some(a));
}
