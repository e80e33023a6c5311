//! Painter trait abstraction.

use kurbo::{Affine, BezPath, Point, Rect};
use peniko::Color;
use std::sync::Arc;

/// Font selection for text drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub family: String,
    pub size: f64,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, size: f64) -> Self {
        Self {
            family: family.into(),
            size,
        }
    }
}

/// Drawing surface the render dispatcher paints onto.
///
/// Implementations keep a transform stack: [`Painter::transform`] post-multiplies
/// onto the current transform, [`Painter::save`] pushes it and
/// [`Painter::restore`] pops it.
pub trait Painter {
    fn save(&mut self);

    fn restore(&mut self);

    /// Apply `affine` on top of the current transform.
    fn transform(&mut self, affine: Affine);

    fn fill_rect(&mut self, rect: Rect, color: Color);

    fn stroke_rect(&mut self, rect: Rect, color: Color, width: f64);

    fn stroke_path(&mut self, path: &BezPath, color: Color, width: f64);

    fn fill_circle(&mut self, center: Point, radius: f64, color: Color);

    /// Draw one line of text with its top-left at `origin`.
    fn draw_text(&mut self, text: &str, origin: Point, font: &FontSpec, color: Color);

    /// Draw a decoded image scaled into `rect`.
    fn draw_image(&mut self, image: &Arc<peniko::ImageData>, rect: Rect);
}
