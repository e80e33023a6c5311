//! Blackboard Render Library
//!
//! Render dispatcher over a [`Painter`] abstraction, with a recording
//! painter, an SVG painter, the graph expression evaluator and the image
//! asset cache.

pub mod assets;
mod display_list;
pub mod expr;
mod graph;
mod painter;
mod renderer;
mod svg;

pub use assets::{AssetCache, AssetError, AssetState, decode_bytes, decode_data_url};
pub use display_list::{DisplayList, DrawOp};
pub use expr::{Expr, ExprError};
pub use graph::{GRAPH_SAMPLES, PlotFrame};
pub use painter::{FontSpec, Painter};
pub use renderer::{RenderContext, StrokePreview, render_board, render_element};
pub use svg::SvgPainter;
