//! # RoofKit Core
//!
//! Core types and utilities for RoofKit.
//! Provides the error taxonomy shared by every layer, the calibration
//! constants of the fixed-zoom aerial imagery, unit conversion, and the
//! pure geometry functions that turn traced pixels into real-world
//! area, perimeter, and line lengths.

pub mod constants;
pub mod error;
pub mod geometry;
pub mod units;

pub use error::{Error, Result, ServiceError, ValidationError};

pub use geometry::{
    distance, line_measurement, polygon_metrics, total_line_length, total_line_length_meters,
    Distance, LineMeasurement, Point, PolygonMetrics,
};

pub use units::{format_area, format_length, MeasurementSystem};
