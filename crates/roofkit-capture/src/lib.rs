//! # RoofKit Capture
//!
//! Turns pointer clicks on the aerial image into roof geometry.
//!
//! ## Core Components
//!
//! - **Surface**: maps viewport pointer coordinates onto the fixed 640×640
//!   image, compensating for layout scaling, and rejects clicks off the image
//! - **Capture**: the state machine holding outline vertices, committed line
//!   segments, and at most one pending segment endpoint
//! - **Scene**: a borrowed render model so any renderer can redraw from data
//!
//! ## Architecture
//!
//! ```text
//! PointerEvent
//!   └── DrawingSurface (scale + bounds)
//!         └── CaptureState (mode, vertices, lines, pending endpoint)
//!               ├── polygon_metrics / total_line_length (roofkit-core)
//!               └── SurfaceScene (render model)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use roofkit_capture::{CaptureState, DrawingSurface, PointerEvent};
//!
//! let surface = DrawingSurface::aerial();
//! let mut capture = CaptureState::new();
//! capture.set_drawing_enabled(true);
//!
//! for (x, y) in [(0.0, 0.0), (100.0, 0.0), (100.0, 100.0)] {
//!     capture.click(&surface, &PointerEvent::new(x, y));
//! }
//! assert!(capture.metrics().area_m2 > 0.0);
//! ```

pub mod capture;
pub mod scene;
pub mod surface;

pub use capture::{CaptureMode, CapturePhase, CaptureState, ClickOutcome, IgnoreReason};
pub use scene::SurfaceScene;
pub use surface::{
    to_surface_coordinates, within_bounds, DrawingSurface, PointerEvent, RenderedRect,
};
