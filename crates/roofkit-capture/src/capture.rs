//! Capture state machine.
//!
//! Owns the live roof outline (polygon vertices) and the ridge/hip line
//! segments, applies clicks according to the active [`CaptureMode`], and keeps
//! the derived metrics recomputed in full after every mutation.

use serde::{Deserialize, Serialize};
use std::fmt;

use roofkit_core::constants::MIN_POLYGON_VERTICES;
use roofkit_core::{
    line_measurement, polygon_metrics, total_line_length, total_line_length_meters,
    LineMeasurement, Point, PolygonMetrics,
};

use crate::scene::SurfaceScene;
use crate::surface::{DrawingSurface, PointerEvent};

/// What a click produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    /// Clicks append roof outline vertices
    #[default]
    Area,
    /// Clicks place segment endpoints
    Lines,
}

impl fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Area => write!(f, "area"),
            Self::Lines => write!(f, "lines"),
        }
    }
}

/// State of the machine as seen by a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapturePhase {
    /// Drawing is disabled; clicks only inspect the image
    Idle,
    CapturingArea,
    CapturingLines,
}

/// Why a click had no effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    DrawingDisabled,
    OutOfBounds,
}

/// Result of applying one click.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClickOutcome {
    Ignored(IgnoreReason),
    /// A vertex was appended; `count` is the new vertex total
    VertexAdded { count: usize },
    /// The first endpoint of a segment is now pending
    SegmentStarted(Point),
    SegmentCompleted(LineMeasurement),
}

impl ClickOutcome {
    pub fn is_ignored(&self) -> bool {
        matches!(self, ClickOutcome::Ignored(_))
    }
}

/// Live drawing state for one roof.
#[derive(Debug, Clone, Default)]
pub struct CaptureState {
    mode: CaptureMode,
    drawing_enabled: bool,
    vertices: Vec<Point>,
    lines: Vec<LineMeasurement>,
    pending_endpoint: Option<Point>,
    metrics: PolygonMetrics,
    total_line_ft: f64,
    total_line_m: f64,
}

impl CaptureState {
    /// Creates an empty state in area mode with drawing disabled.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    pub fn phase(&self) -> CapturePhase {
        match (self.drawing_enabled, self.mode) {
            (false, _) => CapturePhase::Idle,
            (true, CaptureMode::Area) => CapturePhase::CapturingArea,
            (true, CaptureMode::Lines) => CapturePhase::CapturingLines,
        }
    }

    pub fn drawing_enabled(&self) -> bool {
        self.drawing_enabled
    }

    pub fn set_drawing_enabled(&mut self, enabled: bool) {
        self.drawing_enabled = enabled;
    }

    pub fn toggle_drawing(&mut self) -> bool {
        self.drawing_enabled = !self.drawing_enabled;
        self.drawing_enabled
    }

    /// Switches mode without touching the line list.
    ///
    /// Leaving line mode drops a half-drawn segment.
    pub fn set_mode(&mut self, mode: CaptureMode) {
        if self.mode == CaptureMode::Lines && mode != CaptureMode::Lines {
            self.pending_endpoint = None;
        }
        self.mode = mode;
    }

    /// Drops a half-drawn segment. The mode is unchanged.
    pub fn cancel_pending_segment(&mut self) {
        self.pending_endpoint = None;
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn lines(&self) -> &[LineMeasurement] {
        &self.lines
    }

    pub fn pending_endpoint(&self) -> Option<Point> {
        self.pending_endpoint
    }

    pub fn is_drawing_line(&self) -> bool {
        self.pending_endpoint.is_some()
    }

    pub fn metrics(&self) -> PolygonMetrics {
        self.metrics
    }

    pub fn total_line_length_ft(&self) -> f64 {
        self.total_line_ft
    }

    pub fn total_line_length_m(&self) -> f64 {
        self.total_line_m
    }

    /// True when there is something worth persisting.
    pub fn has_measurements(&self) -> bool {
        self.metrics.has_area() || !self.lines.is_empty()
    }

    /// Maps a raw pointer event through the surface and applies it.
    pub fn click(&mut self, surface: &DrawingSurface, event: &PointerEvent) -> ClickOutcome {
        if !self.drawing_enabled {
            return ClickOutcome::Ignored(IgnoreReason::DrawingDisabled);
        }
        match surface.map_click(event) {
            Some(point) => self.apply_point(point),
            None => {
                tracing::debug!(
                    "Ignoring click outside surface at ({:.1}, {:.1})",
                    event.client_x,
                    event.client_y
                );
                ClickOutcome::Ignored(IgnoreReason::OutOfBounds)
            }
        }
    }

    /// Applies an already-mapped, in-bounds surface point.
    pub fn apply_point(&mut self, point: Point) -> ClickOutcome {
        if !self.drawing_enabled {
            return ClickOutcome::Ignored(IgnoreReason::DrawingDisabled);
        }
        match self.mode {
            CaptureMode::Area => self.add_vertex(point),
            CaptureMode::Lines => self.add_line_point(point),
        }
    }

    fn add_vertex(&mut self, point: Point) -> ClickOutcome {
        self.vertices.push(point);
        self.recompute_polygon();
        ClickOutcome::VertexAdded {
            count: self.vertices.len(),
        }
    }

    fn add_line_point(&mut self, point: Point) -> ClickOutcome {
        match self.pending_endpoint.take() {
            None => {
                self.pending_endpoint = Some(point);
                ClickOutcome::SegmentStarted(point)
            }
            Some(start) => {
                let line = line_measurement(start, point);
                self.lines.push(line);
                self.recompute_lines();
                ClickOutcome::SegmentCompleted(line)
            }
        }
    }

    /// Empties the outline. Lines are untouched.
    pub fn clear_drawing(&mut self) {
        self.vertices.clear();
        self.recompute_polygon();
    }

    /// Empties the line list and drops any pending endpoint. Vertices are untouched.
    pub fn clear_lines(&mut self) {
        self.lines.clear();
        self.pending_endpoint = None;
        self.recompute_lines();
    }

    /// Area → Lines. Line capture always starts fresh.
    ///
    /// Returns false when already in line mode.
    pub fn go_to_next_mode(&mut self) -> bool {
        if self.mode != CaptureMode::Area {
            return false;
        }
        self.mode = CaptureMode::Lines;
        self.clear_lines();
        true
    }

    /// Lines → Area. Existing lines are discarded.
    ///
    /// Returns false when already in area mode.
    pub fn go_to_previous_mode(&mut self) -> bool {
        if self.mode != CaptureMode::Lines {
            return false;
        }
        self.mode = CaptureMode::Area;
        self.clear_lines();
        true
    }

    /// Replaces geometry wholesale, e.g. from a stored snapshot.
    ///
    /// Line lengths are re-derived from their endpoints.
    pub fn restore(&mut self, vertices: Vec<Point>, lines: &[LineMeasurement]) {
        self.vertices = vertices;
        self.lines = lines
            .iter()
            .map(|l| line_measurement(l.start(), l.end()))
            .collect();
        self.pending_endpoint = None;
        self.recompute_polygon();
        self.recompute_lines();
    }

    /// Like [`CaptureState::restore`], for records that may carry metrics
    /// without an outline.
    ///
    /// With fewer than three vertices the stored metrics become the live
    /// metrics. The next vertex click recomputes them from the new outline.
    pub fn restore_measured(
        &mut self,
        vertices: Vec<Point>,
        lines: &[LineMeasurement],
        stored: PolygonMetrics,
    ) {
        self.restore(vertices, lines);
        if self.vertices.len() < MIN_POLYGON_VERTICES && stored.has_area() {
            self.metrics = stored;
        }
    }

    /// Back to the initial state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Borrowed render model of the current state.
    pub fn scene(&self) -> SurfaceScene<'_> {
        SurfaceScene {
            mode: self.mode,
            vertices: &self.vertices,
            lines: &self.lines,
            pending_endpoint: self.pending_endpoint,
        }
    }

    fn recompute_polygon(&mut self) {
        self.metrics = polygon_metrics(&self.vertices);
    }

    fn recompute_lines(&mut self) {
        self.total_line_ft = total_line_length(&self.lines);
        self.total_line_m = total_line_length_meters(&self.lines);
    }
}
