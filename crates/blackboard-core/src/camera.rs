//! Pan/zoom view transform between screen and canvas space.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MIN_ZOOM: f64 = 0.1;
pub const DEFAULT_MAX_ZOOM: f64 = 5.0;

/// Selection outline width in screen pixels.
const SELECTION_LINE_WIDTH: f64 = 2.0;

/// Camera manages the view transform for the canvas.
///
/// `screen = canvas * zoom + pan`. The pan is unbounded; zoom is clamped to
/// `[min_zoom, max_zoom]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Camera {
    /// Translation of the canvas origin, in screen pixels.
    pub pan: Vec2,
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Camera with custom zoom bounds. Inverted bounds are swapped; a bound
    /// that is zero, negative or not finite falls back to its default.
    pub fn with_zoom_bounds(min_zoom: f64, max_zoom: f64) -> Self {
        let usable = |zoom: f64| zoom.is_finite() && zoom > 0.0;
        if !usable(min_zoom) || !usable(max_zoom) {
            log::warn!("Ignoring invalid zoom bounds [{}, {}]", min_zoom, max_zoom);
        }
        let min_zoom = if usable(min_zoom) { min_zoom } else { DEFAULT_MIN_ZOOM };
        let max_zoom = if usable(max_zoom) { max_zoom } else { DEFAULT_MAX_ZOOM };
        let (min_zoom, max_zoom) = if min_zoom <= max_zoom {
            (min_zoom, max_zoom)
        } else {
            (max_zoom, min_zoom)
        };
        Self {
            zoom: 1.0_f64.clamp(min_zoom, max_zoom),
            min_zoom,
            max_zoom,
            ..Self::default()
        }
    }

    /// Canvas-to-screen transform: `translate(pan) * scale(zoom)`.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.zoom)
    }

    /// Screen-to-canvas transform.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.pan)
    }

    /// `((sx - panX) / zoom, (sy - panY) / zoom)`
    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.pan.x) / self.zoom,
            (screen.y - self.pan.y) / self.zoom,
        )
    }

    /// `(cx * zoom + panX, cy * zoom + panY)`
    pub fn canvas_to_screen(&self, canvas: Point) -> Point {
        Point::new(
            canvas.x * self.zoom + self.pan.x,
            canvas.y * self.zoom + self.pan.y,
        )
    }

    /// Pan by a screen-space delta. Non-finite deltas are ignored.
    pub fn pan_by(&mut self, delta: Vec2) {
        if delta.x.is_finite() && delta.y.is_finite() {
            self.pan += delta;
        }
    }

    /// Change zoom by an additive delta, keeping the canvas point under
    /// `screen` fixed.
    pub fn zoom_at(&mut self, screen: Point, delta: f64) {
        if !delta.is_finite() || !screen.x.is_finite() || !screen.y.is_finite() {
            return;
        }
        // Bounds are public fields; `clamp` panics on inverted or NaN bounds
        if !(self.zoom > 0.0 && self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom) {
            return;
        }
        let new_zoom = (self.zoom + delta).clamp(self.min_zoom, self.max_zoom);
        if new_zoom == self.zoom || !new_zoom.is_finite() {
            return;
        }
        let ratio = new_zoom / self.zoom;
        self.pan = Vec2::new(
            screen.x - (screen.x - self.pan.x) * ratio,
            screen.y - (screen.y - self.pan.y) * ratio,
        );
        self.zoom = new_zoom;
    }

    /// Screen-space line width for overlays drawn in canvas space.
    pub fn selection_line_width(&self) -> f64 {
        SELECTION_LINE_WIDTH / self.zoom
    }

    /// Canvas-space rectangle visible in a viewport of the given size.
    pub fn visible_rect(&self, viewport: Size) -> Rect {
        Rect::from_points(
            self.screen_to_canvas(Point::ZERO),
            self.screen_to_canvas(Point::new(viewport.width, viewport.height)),
        )
    }

    /// Reset to the origin at 100%.
    pub fn reset(&mut self) {
        self.pan = Vec2::ZERO;
        self.zoom = 1.0_f64.clamp(self.min_zoom, self.max_zoom);
    }

    /// Fit the camera to show the given bounding box.
    pub fn fit_to_bounds(&mut self, bounds: Rect, viewport: Size, padding: f64) {
        if bounds.is_zero_area() || !bounds.is_finite() {
            self.reset();
            return;
        }

        let padded = Size::new(
            (viewport.width - padding * 2.0).max(1.0),
            (viewport.height - padding * 2.0).max(1.0),
        );

        let scale_x = padded.width / bounds.width();
        let scale_y = padded.height / bounds.height();
        self.zoom = scale_x.min(scale_y).clamp(self.min_zoom, self.max_zoom);

        // Center the bounds in the viewport
        let center = bounds.center();
        self.pan = Vec2::new(
            viewport.width / 2.0 - center.x * self.zoom,
            viewport.height / 2.0 - center.y * self.zoom,
        );
    }
}
