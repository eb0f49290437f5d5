//! Drawing surface coordinate mapping.
//!
//! Handles conversion between pointer coordinates (viewport space) and image
//! pixel coordinates (surface space). The surface has a fixed logical
//! resolution while the rendered element may be scaled by layout, so every
//! click is rescaled before it reaches the capture state machine.

use std::fmt;

use roofkit_core::constants::SURFACE_SIZE;
use roofkit_core::Point;

/// A pointer event position in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub client_x: f64,
    pub client_y: f64,
}

impl PointerEvent {
    pub fn new(client_x: f64, client_y: f64) -> Self {
        Self { client_x, client_y }
    }
}

/// Where the surface is drawn on screen and at what size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderedRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl RenderedRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

/// Logical surface plus its current on-screen placement.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingSurface {
    logical_width: f64,
    logical_height: f64,
    rendered: RenderedRect,
}

impl DrawingSurface {
    /// Creates a surface rendered at its logical size at the origin.
    pub fn new(logical_width: f64, logical_height: f64) -> Self {
        Self {
            logical_width,
            logical_height,
            rendered: RenderedRect::new(0.0, 0.0, logical_width, logical_height),
        }
    }

    /// The 640×640 surface matching the calibrated aerial image.
    pub fn aerial() -> Self {
        Self::new(SURFACE_SIZE as f64, SURFACE_SIZE as f64)
    }

    /// Gets the logical width.
    pub fn logical_width(&self) -> f64 {
        self.logical_width
    }

    /// Gets the logical height.
    pub fn logical_height(&self) -> f64 {
        self.logical_height
    }

    /// Gets the rendered rectangle.
    pub fn rendered(&self) -> RenderedRect {
        self.rendered
    }

    /// Updates the on-screen placement (called when layout or zoom changes).
    pub fn set_rendered_rect(&mut self, rect: RenderedRect) {
        self.rendered = rect;
    }

    /// Logical pixels per rendered pixel along X.
    ///
    /// A collapsed element (zero or negative width) maps 1:1.
    pub fn scale_x(&self) -> f64 {
        if self.rendered.width > 0.0 {
            self.logical_width / self.rendered.width
        } else {
            1.0
        }
    }

    /// Logical pixels per rendered pixel along Y.
    pub fn scale_y(&self) -> f64 {
        if self.rendered.height > 0.0 {
            self.logical_height / self.rendered.height
        } else {
            1.0
        }
    }

    /// Converts a pointer event to surface pixel coordinates.
    ///
    /// Formula:
    /// ```text
    /// x = (client_x - left) * logical_width / rendered_width
    /// y = (client_y - top) * logical_height / rendered_height
    /// ```
    pub fn to_surface_coordinates(&self, event: &PointerEvent) -> Point {
        let x = (event.client_x - self.rendered.left) * self.scale_x();
        let y = (event.client_y - self.rendered.top) * self.scale_y();
        Point::new(x, y)
    }

    /// Checks a surface point against `[0, width] × [0, height]`, edges included.
    pub fn within_bounds(&self, point: &Point) -> bool {
        point.x >= 0.0
            && point.x <= self.logical_width
            && point.y >= 0.0
            && point.y <= self.logical_height
    }

    /// Maps a pointer event and keeps it only if it lands on the surface.
    pub fn map_click(&self, event: &PointerEvent) -> Option<Point> {
        let point = self.to_surface_coordinates(event);
        self.within_bounds(&point).then_some(point)
    }
}

/// Free-function form of [`DrawingSurface::to_surface_coordinates`].
pub fn to_surface_coordinates(event: &PointerEvent, surface: &DrawingSurface) -> Point {
    surface.to_surface_coordinates(event)
}

/// Free-function form of [`DrawingSurface::within_bounds`].
pub fn within_bounds(point: &Point, surface: &DrawingSurface) -> bool {
    surface.within_bounds(point)
}

impl fmt::Display for DrawingSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Surface {:.0}x{:.0} | Rendered {:.1}x{:.1} at ({:.1}, {:.1})",
            self.logical_width,
            self.logical_height,
            self.rendered.width,
            self.rendered.height,
            self.rendered.left,
            self.rendered.top
        )
    }
}

impl Default for DrawingSurface {
    fn default() -> Self {
        Self::aerial()
    }
}
