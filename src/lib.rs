//! # RoofKit
//!
//! Roof measurement capture from fixed-zoom aerial imagery:
//! - Trace the roof outline to get area and perimeter
//! - Mark ridge, hip and valley lines to get capping lengths
//! - Persist the working geometry and saved measurements per address
//! - Estimate roofing materials from the measured roof
//!
//! ## Architecture
//!
//! RoofKit is organized as a workspace with multiple crates:
//!
//! 1. **roofkit-core** - Calibration constants, errors, units, geometry
//! 2. **roofkit-capture** - Drawing surface mapping and the capture state machine
//! 3. **roofkit-workflow** - Address search, snapshots, cache and repository plumbing
//! 4. **roofkit-settings** - Configuration files
//! 5. **roofkit-pricing** - Product scraping, catalog and material estimates
//! 6. **roofkit** - This crate: logging setup and trace replay for the binary

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub use roofkit_capture::{CaptureMode, CaptureState, DrawingSurface};
pub use roofkit_core::{LineMeasurement, MeasurementSystem, Point, PolygonMetrics};
pub use roofkit_pricing::{MaterialEstimate, ProductCatalog};
pub use roofkit_settings::Config;
pub use roofkit_workflow::{WorkflowController, WorkflowStep};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(())
}

/// A recorded tracing session: outline vertices and line segments in
/// surface pixels, in click order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Trace {
    #[serde(default)]
    pub points: Vec<Point>,
    #[serde(default)]
    pub lines: Vec<[Point; 2]>,
}

impl Trace {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read trace {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse trace {}", path.display()))
    }
}

/// Measurements and estimate produced by replaying a [`Trace`].
#[derive(Debug, Clone, Serialize)]
pub struct TraceReport {
    pub metrics: PolygonMetrics,
    pub vertex_count: usize,
    pub lines: Vec<LineMeasurement>,
    pub total_line_length_ft: f64,
    pub total_line_length_m: f64,
    /// Clicks dropped for falling off the image
    pub skipped: usize,
    pub estimate: MaterialEstimate,
}

/// Replays a trace through the capture state machine as if each point
/// were clicked on the aerial image. Prices come from the built-in catalog
/// aged by `config.pricing`.
pub fn replay(trace: &Trace, config: &Config) -> TraceReport {
    let surface = DrawingSurface::aerial();
    let mut capture = CaptureState::new();
    capture.set_drawing_enabled(true);
    let mut skipped = 0;

    for point in &trace.points {
        if surface.within_bounds(point) {
            capture.apply_point(*point);
        } else {
            tracing::warn!("Skipping off-image point ({:.1}, {:.1})", point.x, point.y);
            skipped += 1;
        }
    }

    capture.set_mode(CaptureMode::Lines);
    for [start, end] in &trace.lines {
        // A segment with an off-image endpoint is dropped whole
        if !surface.within_bounds(start) || !surface.within_bounds(end) {
            tracing::warn!("Skipping off-image segment");
            skipped += 1;
            continue;
        }
        capture.apply_point(*start);
        capture.apply_point(*end);
    }

    let metrics = capture.metrics();
    let total_line_length_ft = capture.total_line_length_ft();
    let catalog = ProductCatalog::from_settings(&config.pricing, chrono::Utc::now());
    TraceReport {
        metrics,
        vertex_count: capture.vertex_count(),
        lines: capture.lines().to_vec(),
        total_line_length_ft,
        total_line_length_m: capture.total_line_length_m(),
        skipped,
        estimate: MaterialEstimate::from_catalog_metrics(&catalog, &metrics, total_line_length_ft),
    }
}

/// Reads a trace file and replays it.
pub fn run_trace(path: &Path, config: &Config) -> anyhow::Result<TraceReport> {
    let trace = Trace::from_file(path)?;
    tracing::info!(
        "Replaying {} vertices and {} segments from {}",
        trace.points.len(),
        trace.lines.len(),
        path.display()
    );
    Ok(replay(&trace, config))
}
