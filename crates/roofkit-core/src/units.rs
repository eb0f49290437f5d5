//! Unit display utilities
//!
//! Measurements are always computed in both systems at once; this module
//! only decides which of the pair to show and how to label it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::geometry::{LineMeasurement, PolygonMetrics};

/// Measurement system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementSystem {
    /// Square meters and meters
    Metric,
    /// Square feet and feet
    Imperial,
}

impl Default for MeasurementSystem {
    fn default() -> Self {
        Self::Imperial
    }
}

impl fmt::Display for MeasurementSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metric => write!(f, "Metric"),
            Self::Imperial => write!(f, "Imperial"),
        }
    }
}

impl FromStr for MeasurementSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "metric" | "m" => Ok(Self::Metric),
            "imperial" | "ft" | "feet" => Ok(Self::Imperial),
            _ => Err(format!("Unknown measurement system: {}", s)),
        }
    }
}

/// Get the length unit label for the given system ("m" or "ft")
pub fn length_label(system: MeasurementSystem) -> &'static str {
    match system {
        MeasurementSystem::Metric => "m",
        MeasurementSystem::Imperial => "ft",
    }
}

/// Get the area unit label for the given system ("m²" or "sq ft")
pub fn area_label(system: MeasurementSystem) -> &'static str {
    match system {
        MeasurementSystem::Metric => "m²",
        MeasurementSystem::Imperial => "sq ft",
    }
}

/// Format the polygon area for display
pub fn format_area(metrics: &PolygonMetrics, system: MeasurementSystem) -> String {
    let value = match system {
        MeasurementSystem::Metric => metrics.area_m2,
        MeasurementSystem::Imperial => metrics.area_ft2,
    };
    format!("{:.1} {}", value, area_label(system))
}

/// Format a length given in both units for display
///
/// * `feet` / `meters` - The same length in each system
pub fn format_length(feet: f64, meters: f64, system: MeasurementSystem) -> String {
    let value = match system {
        MeasurementSystem::Metric => meters,
        MeasurementSystem::Imperial => feet,
    };
    format!("{:.1} {}", value, length_label(system))
}

/// Format one line segment's length for display
pub fn format_line(line: &LineMeasurement, system: MeasurementSystem) -> String {
    format_length(line.length_ft(), line.length_m(), system)
}
