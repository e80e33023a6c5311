//! A painter that records draw operations.

use crate::painter::{FontSpec, Painter};
use kurbo::{Affine, BezPath, Point, Rect};
use peniko::Color;
use std::sync::Arc;

/// One recorded draw call, with the transform active when it was issued.
#[derive(Debug, Clone)]
pub enum DrawOp {
    FillRect {
        rect: Rect,
        color: Color,
        transform: Affine,
    },
    StrokeRect {
        rect: Rect,
        color: Color,
        width: f64,
        transform: Affine,
    },
    StrokePath {
        path: BezPath,
        color: Color,
        width: f64,
        transform: Affine,
    },
    FillCircle {
        center: Point,
        radius: f64,
        color: Color,
        transform: Affine,
    },
    Text {
        text: String,
        origin: Point,
        font: FontSpec,
        color: Color,
        transform: Affine,
    },
    Image {
        image: Arc<peniko::ImageData>,
        rect: Rect,
        transform: Affine,
    },
}

impl DrawOp {
    pub fn transform(&self) -> Affine {
        match self {
            DrawOp::FillRect { transform, .. }
            | DrawOp::StrokeRect { transform, .. }
            | DrawOp::StrokePath { transform, .. }
            | DrawOp::FillCircle { transform, .. }
            | DrawOp::Text { transform, .. }
            | DrawOp::Image { transform, .. } => *transform,
        }
    }
}

/// Recorded frame, used for headless runs and tests.
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    ops: Vec<DrawOp>,
    current: Affine,
    stack: Vec<Affine>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Text strings in paint order.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Forget recorded ops and reset the transform state.
    pub fn clear(&mut self) {
        self.ops.clear();
        self.current = Affine::IDENTITY;
        self.stack.clear();
    }
}

impl Painter for DisplayList {
    fn save(&mut self) {
        self.stack.push(self.current);
    }

    fn restore(&mut self) {
        match self.stack.pop() {
            Some(affine) => self.current = affine,
            None => log::warn!("Unbalanced restore in display list"),
        }
    }

    fn transform(&mut self, affine: Affine) {
        self.current = self.current * affine;
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.ops.push(DrawOp::FillRect {
            rect,
            color,
            transform: self.current,
        });
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, width: f64) {
        self.ops.push(DrawOp::StrokeRect {
            rect,
            color,
            width,
            transform: self.current,
        });
    }

    fn stroke_path(&mut self, path: &BezPath, color: Color, width: f64) {
        self.ops.push(DrawOp::StrokePath {
            path: path.clone(),
            color,
            width,
            transform: self.current,
        });
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Color) {
        self.ops.push(DrawOp::FillCircle {
            center,
            radius,
            color,
            transform: self.current,
        });
    }

    fn draw_text(&mut self, text: &str, origin: Point, font: &FontSpec, color: Color) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            origin,
            font: font.clone(),
            color,
            transform: self.current,
        });
    }

    fn draw_image(&mut self, image: &Arc<peniko::ImageData>, rect: Rect) {
        self.ops.push(DrawOp::Image {
            image: Arc::clone(image),
            rect,
            transform: self.current,
        });
    }
}
