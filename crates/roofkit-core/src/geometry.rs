//! Roof geometry in image-pixel space.
//!
//! Every function here is pure. Pixel quantities are converted to meters
//! with [`METERS_PER_PIXEL`] and then to feet with fixed factors, so the
//! metric and imperial values of one result are always derived together.

use serde::{Deserialize, Serialize};

use crate::constants::{FEET_PER_METER, METERS_PER_PIXEL, MIN_POLYGON_VERTICES, SQFT_PER_SQM};

/// A 2-D coordinate in image-pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in pixels.
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Area and perimeter of the traced roof outline in both unit systems.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PolygonMetrics {
    pub area_ft2: f64,
    pub perimeter_ft: f64,
    pub area_m2: f64,
    pub perimeter_m: f64,
}

impl PolygonMetrics {
    /// All-zero metrics, used for fewer than three vertices.
    pub const ZERO: PolygonMetrics = PolygonMetrics {
        area_ft2: 0.0,
        perimeter_ft: 0.0,
        area_m2: 0.0,
        perimeter_m: 0.0,
    };

    pub fn has_area(&self) -> bool {
        self.area_ft2 > 0.0
    }
}

/// Real-world length of a pixel distance.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Distance {
    pub feet: f64,
    pub meters: f64,
}

/// A completed line segment with its derived lengths.
///
/// Fields are private so the lengths can never drift from the endpoints;
/// build one with [`line_measurement`] or [`LineMeasurement::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "LineEndpoints")]
pub struct LineMeasurement {
    start: Point,
    end: Point,
    length_ft: f64,
    length_m: f64,
}

/// Deserialization goes through the endpoints only; stored lengths are
/// recomputed rather than trusted.
#[derive(Deserialize)]
struct LineEndpoints {
    start: Point,
    end: Point,
}

impl From<LineEndpoints> for LineMeasurement {
    fn from(raw: LineEndpoints) -> Self {
        LineMeasurement::new(raw.start, raw.end)
    }
}

impl LineMeasurement {
    pub fn new(start: Point, end: Point) -> Self {
        let d = distance(&start, &end);
        Self {
            start,
            end,
            length_ft: d.feet,
            length_m: d.meters,
        }
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }

    pub fn length_ft(&self) -> f64 {
        self.length_ft
    }

    pub fn length_m(&self) -> f64 {
        self.length_m
    }
}

/// Computes area and perimeter of a closed polygon.
///
/// Uses the shoelace formula over consecutive vertex pairs, wrapping the
/// last vertex back to the first. Winding direction does not matter. Fewer
/// than three vertices yield [`PolygonMetrics::ZERO`].
pub fn polygon_metrics(points: &[Point]) -> PolygonMetrics {
    let n = points.len();
    if n < MIN_POLYGON_VERTICES {
        return PolygonMetrics::ZERO;
    }

    let mut twice_area = 0.0;
    let mut perimeter_px = 0.0;
    for i in 0..n {
        let a = &points[i];
        let b = &points[(i + 1) % n];
        twice_area += a.x * b.y - b.x * a.y;
        perimeter_px += a.distance_to(b);
    }
    let area_px = twice_area.abs() / 2.0;

    let area_m2 = area_px * METERS_PER_PIXEL * METERS_PER_PIXEL;
    let perimeter_m = perimeter_px * METERS_PER_PIXEL;

    PolygonMetrics {
        area_ft2: area_m2 * SQFT_PER_SQM,
        perimeter_ft: perimeter_m * FEET_PER_METER,
        area_m2,
        perimeter_m,
    }
}

/// Real-world distance between two pixel positions.
pub fn distance(a: &Point, b: &Point) -> Distance {
    let meters = a.distance_to(b) * METERS_PER_PIXEL;
    Distance {
        feet: meters * FEET_PER_METER,
        meters,
    }
}

/// Packages [`distance`] into a segment record.
pub fn line_measurement(start: Point, end: Point) -> LineMeasurement {
    LineMeasurement::new(start, end)
}

/// Sum of all segment lengths in feet.
pub fn total_line_length(lines: &[LineMeasurement]) -> f64 {
    lines.iter().map(LineMeasurement::length_ft).sum()
}

/// Sum of all segment lengths in meters.
pub fn total_line_length_meters(lines: &[LineMeasurement]) -> f64 {
    lines.iter().map(LineMeasurement::length_m).sum()
}
