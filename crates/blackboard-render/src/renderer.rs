//! Render dispatcher: walks the board in z-order and paints each element.

use crate::assets::AssetCache;
use crate::expr::Expr;
use crate::graph::PlotFrame;
use crate::painter::{FontSpec, Painter};
use blackboard_core::{Board, Element, GraphPayload, ImagePayload, Payload, StrokePayload, TextPayload};
use kurbo::{BezPath, Point, Rect, Size};
use peniko::Color;

/// Context for a single render frame.
pub struct RenderContext<'a> {
    pub board: &'a Board,
    /// Decoded images; without a cache every image draws as a placeholder.
    pub assets: Option<&'a AssetCache>,
    /// Viewport size in screen pixels.
    pub viewport_size: Size,
    pub background_color: Color,
    pub selection_color: Color,
    /// Marquee rectangle in screen coordinates.
    pub marquee: Option<Rect>,
    /// Stroke being drawn, in canvas coordinates.
    pub preview_stroke: Option<&'a StrokePreview>,
}

/// An in-progress pen stroke.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokePreview {
    pub points: Vec<Point>,
    pub color: Color,
    pub width: f64,
}

impl<'a> RenderContext<'a> {
    pub fn new(board: &'a Board, viewport_size: Size) -> Self {
        Self {
            board,
            assets: None,
            viewport_size,
            background_color: Color::from_rgba8(250, 250, 250, 255),
            selection_color: Color::from_rgba8(59, 130, 246, 255), // Blue
            marquee: None,
            preview_stroke: None,
        }
    }

    pub fn with_assets(mut self, assets: &'a AssetCache) -> Self {
        self.assets = Some(assets);
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    pub fn with_selection_color(mut self, color: Color) -> Self {
        self.selection_color = color;
        self
    }

    pub fn with_marquee(mut self, rect: Option<Rect>) -> Self {
        self.marquee = rect;
        self
    }

    pub fn with_preview_stroke(mut self, preview: Option<&'a StrokePreview>) -> Self {
        self.preview_stroke = preview;
        self
    }
}

/// Paint one frame.
///
/// Elements are painted in canvas space under the camera transform; the
/// marquee is painted afterwards in screen space.
pub fn render_board(painter: &mut dyn Painter, ctx: &RenderContext) {
    let board = ctx.board;
    let viewport = Rect::from_origin_size(Point::ZERO, ctx.viewport_size);
    painter.fill_rect(viewport, ctx.background_color);

    painter.save();
    painter.transform(board.camera.transform());

    for element in board.store.all_elements() {
        render_element(painter, element, ctx.assets);
    }

    if let Some(preview) = ctx.preview_stroke {
        render_preview(painter, preview);
    }

    let line_width = board.camera.selection_line_width();
    for element in board.store.selected_elements() {
        painter.stroke_rect(element.bounds(), ctx.selection_color, line_width);
    }

    painter.restore();

    if let Some(rect) = ctx.marquee {
        render_marquee(painter, rect.abs(), ctx.selection_color);
    }
}

/// Paint one element in canvas coordinates.
pub fn render_element(painter: &mut dyn Painter, element: &Element, assets: Option<&AssetCache>) {
    match &element.payload {
        Payload::Text(text) => render_text(painter, text, element.position),
        Payload::Stroke(stroke) => render_stroke(painter, stroke, element.position),
        Payload::Image(image) => {
            let ready = assets.and_then(|cache| cache.image(&element.id));
            match ready {
                Some(decoded) => painter.draw_image(decoded, element.bounds()),
                None => render_image_placeholder(painter, image, element.bounds()),
            }
        }
        Payload::Graph(graph) => render_graph(painter, graph, element.bounds()),
        Payload::Unknown { kind, .. } => {
            log::trace!("No renderer for element kind {}", kind);
            painter.stroke_rect(element.bounds(), Color::from_rgba8(160, 160, 160, 255), 1.0);
        }
    }
}

fn render_text(painter: &mut dyn Painter, text: &TextPayload, origin: Point) {
    let font = FontSpec::new(text.font_family.as_str(), text.font_size);
    let color: Color = text.color.into();
    let advance = text.line_advance();
    for (i, line) in text.lines.iter().enumerate() {
        if line.is_empty() {
            continue;
        }
        let at = Point::new(origin.x, origin.y + advance * i as f64);
        painter.draw_text(line, at, &font, color);
    }
}

fn render_stroke(painter: &mut dyn Painter, stroke: &StrokePayload, origin: Point) {
    let color: Color = stroke.color.into();
    // A single point paints as a dot
    if let [only] = stroke.points.as_slice() {
        painter.fill_circle(*only + origin.to_vec2(), stroke.width / 2.0, color);
        return;
    }
    let path = stroke.to_path(origin.to_vec2());
    if !path.is_empty() {
        painter.stroke_path(&path, color, stroke.width);
    }
}

/// Gray frame with an X for images that are not decoded (yet).
fn render_image_placeholder(painter: &mut dyn Painter, image: &ImagePayload, bounds: Rect) {
    log::trace!("Image placeholder for {}", image.mime_type().unwrap_or("external source"));
    painter.fill_rect(bounds, Color::from_rgba8(200, 200, 200, 255));

    let mut x_path = BezPath::new();
    x_path.move_to(Point::new(bounds.x0, bounds.y0));
    x_path.line_to(Point::new(bounds.x1, bounds.y1));
    x_path.move_to(Point::new(bounds.x1, bounds.y0));
    x_path.line_to(Point::new(bounds.x0, bounds.y1));
    painter.stroke_path(&x_path, Color::from_rgba8(150, 150, 150, 255), 2.0);

    painter.stroke_rect(bounds, Color::from_rgba8(100, 100, 100, 255), 2.0);
}

fn render_graph(painter: &mut dyn Painter, graph: &GraphPayload, bounds: Rect) {
    painter.fill_rect(bounds, Color::WHITE);
    painter.stroke_rect(bounds, Color::from_rgba8(209, 213, 219, 255), 1.0);

    let Some(frame) = PlotFrame::new(graph, bounds) else {
        log::warn!("Graph '{}' has unusable axis bounds", graph.expression);
        return;
    };
    let axes = frame.axes();
    if !axes.is_empty() {
        painter.stroke_path(&axes, Color::from_rgba8(107, 114, 128, 255), 1.0);
    }

    let expr = match Expr::parse(&graph.expression) {
        Ok(expr) => expr,
        Err(e) => {
            log::warn!("Cannot plot '{}': {}", graph.expression, e);
            return;
        }
    };
    let color: Color = graph.color.into();
    for run in frame.curve(&expr) {
        painter.stroke_path(&run, color, 2.0);
    }
}

fn render_preview(painter: &mut dyn Painter, preview: &StrokePreview) {
    match preview.points.as_slice() {
        [] => {}
        [only] => painter.fill_circle(*only, preview.width / 2.0, preview.color),
        [first, rest @ ..] => {
            let mut path = BezPath::new();
            path.move_to(*first);
            for p in rest {
                path.line_to(*p);
            }
            painter.stroke_path(&path, preview.color, preview.width);
        }
    }
}

fn render_marquee(painter: &mut dyn Painter, rect: Rect, color: Color) {
    // Fill with semi-transparent selection color
    painter.fill_rect(rect, color.with_alpha(0.1));
    painter.stroke_rect(rect, color, 1.0);
}
