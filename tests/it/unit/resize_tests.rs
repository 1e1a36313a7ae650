//! Unit tests for corner resize math.

use genboard::geometry::{Bounds, Point};
use genboard::gesture::{ResizeHandle, resize_bounds};

const MIN: f64 = 50.0;

fn ratio(b: &Bounds) -> f64 {
    b.width / b.height
}

#[test]
fn test_aspect_lock_keeps_ratio_from_every_corner() {
    let start = Bounds::new(100.0, 100.0, 300.0, 150.0);
    let pointers = [
        Point::new(10.0, 500.0),
        Point::new(700.0, 20.0),
        Point::new(451.3, 277.7),
        Point::new(-40.0, -90.0),
    ];
    for handle in ResizeHandle::ALL {
        for pointer in pointers {
            let b = resize_bounds(&start, handle, pointer, true, MIN);
            assert!(
                (ratio(&b) - 2.0).abs() < 1e-9,
                "{handle:?} to {pointer:?} gave ratio {}",
                ratio(&b)
            );
            assert!(b.width >= MIN - 1e-9 && b.height >= MIN - 1e-9);
        }
    }
}

#[test]
fn test_se_drag_scales_from_nw_anchor() {
    let start = Bounds::new(0.0, 0.0, 200.0, 100.0);
    let b = resize_bounds(&start, ResizeHandle::Se, Point::new(400.0, 200.0), true, MIN);
    assert_eq!(b, Bounds::new(0.0, 0.0, 400.0, 200.0));
}

#[test]
fn test_aspect_lock_floor_respects_min_size() {
    let start = Bounds::new(0.0, 0.0, 400.0, 100.0);
    // Pointer collapsed onto the anchor
    let b = resize_bounds(&start, ResizeHandle::Se, Point::new(0.0, 0.0), true, MIN);
    assert!((b.height - MIN).abs() < 1e-9);
    assert!((b.width - 200.0).abs() < 1e-9);
    assert_eq!(b.origin(), Point::new(0.0, 0.0));
}

#[test]
fn test_box_never_flips_past_anchor() {
    let start = Bounds::new(100.0, 100.0, 200.0, 200.0);
    // Drag the nw handle far beyond the se anchor
    let b = resize_bounds(&start, ResizeHandle::Nw, Point::new(900.0, 900.0), false, MIN);
    assert_eq!(b.right(), 300.0);
    assert_eq!(b.bottom(), 300.0);
    assert_eq!(b.width, MIN);
    assert_eq!(b.height, MIN);
}

#[test]
fn test_free_resize_follows_pointer_per_axis() {
    let start = Bounds::new(0.0, 0.0, 200.0, 100.0);
    let b = resize_bounds(&start, ResizeHandle::Se, Point::new(260.0, 300.0), false, MIN);
    assert_eq!(b, Bounds::new(0.0, 0.0, 260.0, 300.0));
}
