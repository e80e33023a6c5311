//! Freehand stroke content.

use super::SerializableColor;
use kurbo::{BezPath, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// A freehand stroke. Points are relative to the owning element's position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrokePayload {
    pub points: Vec<Point>,
    #[serde(default)]
    pub color: SerializableColor,
    #[serde(default = "default_width")]
    pub width: f64,
}

fn default_width() -> f64 {
    StrokePayload::DEFAULT_WIDTH
}

impl StrokePayload {
    pub const DEFAULT_WIDTH: f64 = 3.0;

    pub fn new(points: Vec<Point>, color: SerializableColor, width: f64) -> Self {
        Self {
            points,
            color,
            width,
        }
    }

    /// Build a stroke from absolute canvas points.
    ///
    /// Returns the payload with points relative to the bounding box origin,
    /// together with that origin.
    pub fn from_absolute(points: &[Point], color: SerializableColor, width: f64) -> (Self, Point) {
        let Some(bounds) = points_bounds(points) else {
            return (Self::new(Vec::new(), color, width), Point::ZERO);
        };
        let origin = bounds.origin();
        let offset = origin.to_vec2();
        let relative = points.iter().map(|p| *p - offset).collect();
        (Self::new(relative, color, width), origin)
    }

    /// Extent of the relative points, measured from the origin.
    pub fn extent(&self) -> Size {
        let (w, h) = self
            .points
            .iter()
            .fold((0.0_f64, 0.0_f64), |(w, h), p| (w.max(p.x), h.max(p.y)));
        Size::new(w, h)
    }

    /// Path through the stroke points, offset by the element position.
    pub fn to_path(&self, origin: Vec2) -> BezPath {
        let mut path = BezPath::new();
        let mut iter = self.points.iter();
        if let Some(first) = iter.next() {
            path.move_to(*first + origin);
            for p in iter {
                path.line_to(*p + origin);
            }
        }
        path
    }
}

fn points_bounds(points: &[Point]) -> Option<Rect> {
    let first = points.first()?;
    Some(
        points
            .iter()
            .skip(1)
            .fold(Rect::from_points(*first, *first), |r, p| r.union_pt(*p)),
    )
}
