//! Viewport module for zoom and device-to-canvas coordinate mapping.
//!
//! Three sizes are independent here: the internal raster resolution of the
//! page, the on-screen (CSS) size of the element showing it, and the zoom
//! factor that relates the two. Strokes are always recorded in internal
//! space, so changing the zoom never touches stored geometry.

use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// Smallest zoom factor.
pub const MIN_ZOOM: f64 = 0.1;
/// Largest zoom factor.
pub const MAX_ZOOM: f64 = 3.0;
/// Increment used by the zoom in/out controls.
pub const ZOOM_STEP: f64 = 0.1;
/// Internal resolution of a page without a background image.
pub const DEFAULT_PAGE_SIZE: Size = Size::new(1200.0, 1600.0);

/// Map a device (CSS pixel) point into canvas-internal space.
///
/// `dom_rect` is the on-screen rectangle of the canvas element and
/// `internal` its raster resolution. Returns `None` when the element has no
/// area, in which case the scale is undefined and the event should be
/// dropped.
pub fn to_canvas_space(device: Point, dom_rect: Rect, internal: Size) -> Option<Point> {
    if dom_rect.width() <= 0.0 || dom_rect.height() <= 0.0 {
        return None;
    }
    let scale_x = internal.width / dom_rect.width();
    let scale_y = internal.height / dom_rect.height();
    Some(Point::new(
        (device.x - dom_rect.x0) * scale_x,
        (device.y - dom_rect.y0) * scale_y,
    ))
}

/// Inverse of [`to_canvas_space`].
pub fn to_device_space(canvas: Point, dom_rect: Rect, internal: Size) -> Option<Point> {
    if internal.width <= 0.0 || internal.height <= 0.0 {
        return None;
    }
    let scale_x = dom_rect.width() / internal.width;
    let scale_y = dom_rect.height() / internal.height;
    Some(Point::new(
        dom_rect.x0 + canvas.x * scale_x,
        dom_rect.y0 + canvas.y * scale_y,
    ))
}

/// Zoom state and internal resolution of the current page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Current zoom factor (1.0 = one raster unit per CSS pixel).
    zoom: f64,
    /// Internal raster resolution.
    internal_size: Size,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            internal_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Viewport {
    /// Create a viewport at 100% for the given internal resolution.
    pub fn new(internal_size: Size) -> Self {
        Self {
            zoom: 1.0,
            internal_size,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn internal_size(&self) -> Size {
        self.internal_size
    }

    /// Replace the internal resolution (page change or background load).
    pub fn set_internal_size(&mut self, size: Size) {
        self.internal_size = size;
    }

    /// Set the zoom, clamped to [`MIN_ZOOM`, `MAX_ZOOM`].
    /// Returns true if the zoom actually changed.
    pub fn set_zoom(&mut self, zoom: f64) -> bool {
        if !zoom.is_finite() {
            return false;
        }
        let new_zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return false;
        }
        self.zoom = new_zoom;
        true
    }

    /// Step the zoom up by [`ZOOM_STEP`].
    pub fn zoom_in(&mut self) -> bool {
        self.set_zoom(self.zoom + ZOOM_STEP)
    }

    /// Step the zoom down by [`ZOOM_STEP`].
    pub fn zoom_out(&mut self) -> bool {
        self.set_zoom(self.zoom - ZOOM_STEP)
    }

    /// On-screen size of the canvas element.
    pub fn css_size(&self) -> Size {
        Size::new(
            self.internal_size.width * self.zoom,
            self.internal_size.height * self.zoom,
        )
    }

    /// The on-screen rectangle of the canvas when laid out at `origin`.
    pub fn dom_rect(&self, origin: Point) -> Rect {
        Rect::from_origin_size(origin, self.css_size())
    }

    /// Map a device point using the layout rect derived from `origin`.
    pub fn device_to_canvas(&self, device: Point, origin: Point) -> Option<Point> {
        to_canvas_space(device, self.dom_rect(origin), self.internal_size)
    }
}
