//! Render model for the drawing surface.
//!
//! A renderer needs nothing beyond this view to reproduce the traced outline,
//! the committed segments, and the pending segment preview.

use roofkit_core::{LineMeasurement, Point};

use crate::capture::CaptureMode;

/// Borrowed snapshot of what is on the surface right now.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceScene<'a> {
    pub mode: CaptureMode,
    pub vertices: &'a [Point],
    pub lines: &'a [LineMeasurement],
    pub pending_endpoint: Option<Point>,
}

impl SurfaceScene<'_> {
    /// The outline is drawn closed (and filled) from three vertices on.
    pub fn polygon_closed(&self) -> bool {
        self.vertices.len() > 2
    }

    /// Area mode shows the outline; line mode shows segments and the preview.
    pub fn shows_outline(&self) -> bool {
        self.mode == CaptureMode::Area
    }

    pub fn shows_lines(&self) -> bool {
        self.mode == CaptureMode::Lines
    }

    /// Outline edges in drawing order, including the closing edge.
    pub fn outline_edges(&self) -> Vec<(Point, Point)> {
        let n = self.vertices.len();
        if n < 2 {
            return Vec::new();
        }
        let mut edges: Vec<(Point, Point)> = self
            .vertices
            .windows(2)
            .map(|w| (w[0], w[1]))
            .collect();
        if self.polygon_closed() {
            edges.push((self.vertices[n - 1], self.vertices[0]));
        }
        edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CaptureState;

    #[test]
    fn test_open_and_closed_outline() {
        let mut state = CaptureState::new();
        state.set_drawing_enabled(true);
        state.apply_point(Point::new(0.0, 0.0));
        state.apply_point(Point::new(10.0, 0.0));
        let scene = state.scene();
        assert!(!scene.polygon_closed());
        assert_eq!(scene.outline_edges().len(), 1);

        state.apply_point(Point::new(10.0, 10.0));
        let scene = state.scene();
        assert!(scene.polygon_closed());
        assert_eq!(scene.outline_edges().len(), 3);
        assert!(scene.shows_outline());
    }

    #[test]
    fn test_pending_endpoint_is_exposed() {
        let mut state = CaptureState::new();
        state.set_drawing_enabled(true);
        state.set_mode(CaptureMode::Lines);
        state.apply_point(Point::new(4.0, 2.0));
        let scene = state.scene();
        assert!(scene.shows_lines());
        assert_eq!(scene.pending_endpoint, Some(Point::new(4.0, 2.0)));
        assert!(scene.lines.is_empty());
    }
}
