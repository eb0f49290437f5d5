//! The durable measurement record.
//!
//! A snapshot is materialised from the live capture state and mirrored to the
//! local cache and, on explicit save, to the remote store keyed by address.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use roofkit_capture::CaptureState;
use roofkit_core::{LineMeasurement, Point, PolygonMetrics, Result};

/// Resolved latitude/longitude of the measured property.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Address-keyed record of resolved measurements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedMeasurementSnapshot {
    /// Remote record identifier, set once the snapshot has been saved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub address: String,
    pub coordinates: Coordinates,
    pub metrics: PolygonMetrics,
    /// Outline vertices in pixel space
    #[serde(default)]
    pub points: Vec<Point>,
    #[serde(default)]
    pub lines: Vec<LineMeasurement>,
    pub total_line_length_ft: f64,
    pub total_line_length_m: f64,
    pub timestamp: DateTime<Utc>,
}

impl SavedMeasurementSnapshot {
    /// Copies the live geometry and derived values out of a capture state.
    pub fn from_capture(
        address: impl Into<String>,
        coordinates: Coordinates,
        capture: &CaptureState,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            address: address.into(),
            coordinates,
            metrics: capture.metrics(),
            points: capture.vertices().to_vec(),
            lines: capture.lines().to_vec(),
            total_line_length_ft: capture.total_line_length_ft(),
            total_line_length_m: capture.total_line_length_m(),
            timestamp,
        }
    }

    /// Area above zero or at least one line.
    pub fn has_measurements(&self) -> bool {
        self.metrics.has_area() || !self.lines.is_empty()
    }

    pub fn has_lines(&self) -> bool {
        !self.lines.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn traced_state() -> CaptureState {
        let mut capture = CaptureState::new();
        capture.set_drawing_enabled(true);
        for (x, y) in [(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)] {
            capture.apply_point(Point::new(x, y));
        }
        capture.go_to_next_mode();
        capture.apply_point(Point::new(0.0, 0.0));
        capture.apply_point(Point::new(0.0, 50.0));
        capture
    }

    #[test]
    fn test_from_capture_copies_everything() {
        let capture = traced_state();
        let snapshot = SavedMeasurementSnapshot::from_capture(
            "1 Main St",
            Coordinates::new(43.6, -79.4),
            &capture,
            Utc::now(),
        );
        assert_eq!(snapshot.points.len(), 4);
        assert_eq!(snapshot.lines.len(), 1);
        assert_eq!(snapshot.metrics, capture.metrics());
        assert!((snapshot.total_line_length_m - 5.1376).abs() < 1e-3);
        assert!(snapshot.has_measurements());
        assert!(snapshot.id.is_none());
    }

    #[test]
    fn test_json_keeps_line_lengths_consistent() {
        let capture = traced_state();
        let snapshot = SavedMeasurementSnapshot::from_capture(
            "1 Main St",
            Coordinates::default(),
            &capture,
            Utc::now(),
        );
        let restored = SavedMeasurementSnapshot::from_json(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(restored, snapshot);
    }

    #[test]
    fn test_empty_snapshot_has_no_measurements() {
        let snapshot = SavedMeasurementSnapshot::from_capture(
            "1 Main St",
            Coordinates::default(),
            &CaptureState::new(),
            Utc::now(),
        );
        assert!(!snapshot.has_measurements());
    }
}
