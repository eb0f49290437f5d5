//! Calibration and workflow constants.
//!
//! The scale constant is only valid for satellite imagery fetched at
//! [`AERIAL_ZOOM`] with a [`SURFACE_SIZE`]×[`SURFACE_SIZE`] image. Changing
//! either invalidates every measurement.

/// Ground distance in meters represented by one image pixel at zoom 20.
pub const METERS_PER_PIXEL: f64 = 0.10275229357;

/// Inverse of [`METERS_PER_PIXEL`].
pub const PIXELS_PER_METER: f64 = 1.0 / METERS_PER_PIXEL;

/// Image pixels per foot at the calibrated zoom level.
pub const PIXELS_PER_FOOT: f64 = PIXELS_PER_METER * 0.3048;

/// Zoom level the scale constant is calibrated for.
pub const AERIAL_ZOOM: u8 = 20;

/// Logical width and height of the aerial image and drawing surface.
pub const SURFACE_SIZE: u32 = 640;

/// Square feet in one square meter.
pub const SQFT_PER_SQM: f64 = 10.7639;

/// Feet in one meter.
pub const FEET_PER_METER: f64 = 3.28084;

/// Local cache key holding the serialized current snapshot.
pub const SNAPSHOT_CACHE_KEY: &str = "roofing-measurements";

/// Minimum vertex count for a polygon to have area.
pub const MIN_POLYGON_VERTICES: usize = 3;
