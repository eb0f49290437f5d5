//! Capture state machine integration tests driven through the drawing surface

use roofkit_capture::{
    CaptureMode, CapturePhase, CaptureState, ClickOutcome, DrawingSurface, IgnoreReason,
    PointerEvent, RenderedRect,
};
use roofkit_core::constants::METERS_PER_PIXEL;

fn scaled_surface() -> DrawingSurface {
    // Image shown at half size, 40px from the left and 60px from the top
    let mut surface = DrawingSurface::aerial();
    surface.set_rendered_rect(RenderedRect::new(40.0, 60.0, 320.0, 320.0));
    surface
}

/// Pointer position that lands on the given image pixel.
fn click_at(x: f64, y: f64) -> PointerEvent {
    PointerEvent::new(40.0 + x / 2.0, 60.0 + y / 2.0)
}

#[test]
fn test_square_traced_through_scaled_surface() {
    let surface = scaled_surface();
    let mut capture = CaptureState::new();
    capture.set_drawing_enabled(true);
    assert_eq!(capture.phase(), CapturePhase::CapturingArea);

    for (x, y) in [(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)] {
        let outcome = capture.click(&surface, &click_at(x, y));
        assert!(!outcome.is_ignored());
    }

    let metrics = capture.metrics();
    let side = 100.0 * METERS_PER_PIXEL;
    assert!((metrics.area_m2 - side * side).abs() < 1e-9);
    assert!((metrics.perimeter_m - 4.0 * side).abs() < 1e-9);
}

#[test]
fn test_out_of_bounds_clicks_are_silently_ignored() {
    let surface = scaled_surface();
    let mut capture = CaptureState::new();
    capture.set_drawing_enabled(true);

    let outcome = capture.click(&surface, &PointerEvent::new(10.0, 10.0));
    assert_eq!(outcome, ClickOutcome::Ignored(IgnoreReason::OutOfBounds));
    let outcome = capture.click(&surface, &PointerEvent::new(400.0, 100.0));
    assert_eq!(outcome, ClickOutcome::Ignored(IgnoreReason::OutOfBounds));
    assert_eq!(capture.vertex_count(), 0);
}

#[test]
fn test_two_clicks_make_one_line() {
    let surface = DrawingSurface::aerial();
    let mut capture = CaptureState::new();
    capture.set_mode(CaptureMode::Lines);
    capture.set_drawing_enabled(true);

    capture.click(&surface, &PointerEvent::new(0.0, 0.0));
    assert!(capture.is_drawing_line());
    capture.click(&surface, &PointerEvent::new(0.0, 50.0));

    assert_eq!(capture.lines().len(), 1);
    assert!(!capture.is_drawing_line());
    assert!((capture.lines()[0].length_m() - 50.0 * METERS_PER_PIXEL).abs() < 1e-12);
}

#[test]
fn test_previous_step_discards_lines_but_keeps_outline() {
    let surface = DrawingSurface::aerial();
    let mut capture = CaptureState::new();
    capture.set_drawing_enabled(true);
    for (x, y) in [(10.0, 10.0), (200.0, 10.0), (200.0, 200.0)] {
        capture.click(&surface, &PointerEvent::new(x, y));
    }
    let outline = capture.vertices().to_vec();

    assert!(capture.go_to_next_mode());
    for (x, y) in [(10.0, 10.0), (200.0, 10.0), (200.0, 10.0), (200.0, 200.0), (50.0, 50.0)] {
        capture.click(&surface, &PointerEvent::new(x, y));
    }
    assert_eq!(capture.lines().len(), 2);
    assert!(capture.is_drawing_line());

    assert!(capture.go_to_previous_mode());
    assert!(capture.lines().is_empty());
    assert_eq!(capture.pending_endpoint(), None);
    assert_eq!(capture.vertices(), outline.as_slice());
}

#[test]
fn test_toggle_drawing_pauses_capture() {
    let surface = DrawingSurface::aerial();
    let mut capture = CaptureState::new();
    assert!(capture.toggle_drawing());
    capture.click(&surface, &PointerEvent::new(5.0, 5.0));
    assert!(!capture.toggle_drawing());
    let outcome = capture.click(&surface, &PointerEvent::new(6.0, 6.0));
    assert_eq!(outcome, ClickOutcome::Ignored(IgnoreReason::DrawingDisabled));
    assert_eq!(capture.vertex_count(), 1);
    assert_eq!(capture.mode(), CaptureMode::Area);
}
