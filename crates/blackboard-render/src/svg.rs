//! SVG export painter.

use crate::painter::{FontSpec, Painter};
use base64::{Engine, engine::general_purpose::STANDARD};
use blackboard_core::SerializableColor;
use kurbo::{Affine, BezPath, Point, Rect, Size};
use peniko::Color;
use std::fmt::Write;
use std::sync::Arc;

/// Paints into an SVG document string.
pub struct SvgPainter {
    size: Size,
    body: String,
    current: Affine,
    stack: Vec<Affine>,
}

impl SvgPainter {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            body: String::new(),
            current: Affine::IDENTITY,
            stack: Vec::new(),
        }
    }

    /// Close the document and return the SVG source.
    pub fn finish(self) -> String {
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n{body}</svg>\n",
            w = self.size.width,
            h = self.size.height,
            body = self.body,
        )
    }

    fn transform_attr(&self) -> String {
        if self.current == Affine::IDENTITY {
            return String::new();
        }
        let [a, b, c, d, e, f] = self.current.as_coeffs();
        format!(" transform=\"matrix({a} {b} {c} {d} {e} {f})\"")
    }

    fn push(&mut self, element: std::fmt::Arguments<'_>) {
        // Writing to a String cannot fail
        let _ = self.body.write_fmt(element);
        self.body.push('\n');
    }
}

/// `(#rrggbb, opacity)` for an SVG paint attribute.
fn paint(color: Color) -> (String, f32) {
    let rgba = SerializableColor::from(color);
    let opaque = SerializableColor { a: 255, ..rgba };
    (opaque.to_hex(), f32::from(rgba.a) / 255.0)
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn encode_png(image: &peniko::ImageData) -> Option<String> {
    let buffer = image::RgbaImage::from_raw(image.width, image.height, image.data.data().to_vec())?;
    let mut bytes = std::io::Cursor::new(Vec::new());
    if let Err(e) = buffer.write_to(&mut bytes, image::ImageFormat::Png) {
        log::warn!("Failed to encode image for SVG: {}", e);
        return None;
    }
    Some(STANDARD.encode(bytes.into_inner()))
}

impl Painter for SvgPainter {
    fn save(&mut self) {
        self.stack.push(self.current);
    }

    fn restore(&mut self) {
        if let Some(affine) = self.stack.pop() {
            self.current = affine;
        }
    }

    fn transform(&mut self, affine: Affine) {
        self.current = self.current * affine;
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let (fill, opacity) = paint(color);
        let transform = self.transform_attr();
        self.push(format_args!(
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{fill}\" fill-opacity=\"{opacity}\"{transform}/>",
            rect.x0,
            rect.y0,
            rect.width(),
            rect.height(),
        ));
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, width: f64) {
        let (stroke, opacity) = paint(color);
        let transform = self.transform_attr();
        self.push(format_args!(
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"none\" stroke=\"{stroke}\" stroke-opacity=\"{opacity}\" stroke-width=\"{width}\"{transform}/>",
            rect.x0,
            rect.y0,
            rect.width(),
            rect.height(),
        ));
    }

    fn stroke_path(&mut self, path: &BezPath, color: Color, width: f64) {
        let (stroke, opacity) = paint(color);
        let transform = self.transform_attr();
        self.push(format_args!(
            "<path d=\"{}\" fill=\"none\" stroke=\"{stroke}\" stroke-opacity=\"{opacity}\" stroke-width=\"{width}\" stroke-linecap=\"round\" stroke-linejoin=\"round\"{transform}/>",
            path.to_svg(),
        ));
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Color) {
        let (fill, opacity) = paint(color);
        let transform = self.transform_attr();
        self.push(format_args!(
            "<circle cx=\"{}\" cy=\"{}\" r=\"{radius}\" fill=\"{fill}\" fill-opacity=\"{opacity}\"{transform}/>",
            center.x, center.y,
        ));
    }

    fn draw_text(&mut self, text: &str, origin: Point, font: &FontSpec, color: Color) {
        let (fill, opacity) = paint(color);
        let transform = self.transform_attr();
        self.push(format_args!(
            "<text x=\"{}\" y=\"{}\" font-family=\"{}\" font-size=\"{}\" dominant-baseline=\"hanging\" fill=\"{fill}\" fill-opacity=\"{opacity}\"{transform}>{}</text>",
            origin.x,
            origin.y,
            escape(&font.family),
            font.size,
            escape(text),
        ));
    }

    fn draw_image(&mut self, image: &Arc<peniko::ImageData>, rect: Rect) {
        let Some(encoded) = encode_png(image) else {
            return;
        };
        let transform = self.transform_attr();
        self.push(format_args!(
            "<image x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"none\" href=\"data:image/png;base64,{encoded}\"{transform}/>",
            rect.x0,
            rect.y0,
            rect.width(),
            rect.height(),
        ));
    }
}
