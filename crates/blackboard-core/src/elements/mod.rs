//! Element definitions for the board.

mod graph;
mod image;
mod stroke;
mod text;

pub use graph::GraphPayload;
pub use image::ImagePayload;
pub use stroke::StrokePayload;
pub use text::TextPayload;

use kurbo::{Point, Rect, Size, Vec2};
use peniko::Color;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};
#[cfg(target_arch = "wasm32")]
use web_time::{SystemTime, UNIX_EPOCH};

/// Unique identifier for elements.
///
/// Fresh ids are UUID v4 strings, but ids read from documents are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Generate a fresh identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ElementId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Serializable color representation (RGBA8), stored as a CSS hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(color: &str) -> Option<Self> {
        let hex = color.trim().strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => Some(Self::new(
                channel(&hex[0..1])? * 17,
                channel(&hex[1..2])? * 17,
                channel(&hex[2..3])? * 17,
                255,
            )),
            6 => Some(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                255,
            )),
            8 => Some(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                channel(&hex[6..8])?,
            )),
            _ => None,
        }
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Default for SerializableColor {
    fn default() -> Self {
        Self::black()
    }
}

impl Serialize for SerializableColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for SerializableColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_hex(&raw).unwrap_or_else(|| {
            log::debug!("Unrecognized color {:?}, using black", raw);
            Self::black()
        }))
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// The kind tag of an element, as written in documents.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Text,
    Stroke,
    Image,
    Graph,
    Other(String),
}

impl ElementKind {
    pub fn as_str(&self) -> &str {
        match self {
            ElementKind::Text => "text",
            ElementKind::Stroke => "stroke",
            ElementKind::Image => "image",
            ElementKind::Graph => "graph",
            ElementKind::Other(kind) => kind,
        }
    }

    pub fn parse(kind: &str) -> Self {
        match kind {
            "text" => ElementKind::Text,
            "stroke" => ElementKind::Stroke,
            "image" => ElementKind::Image,
            "graph" => ElementKind::Graph,
            other => ElementKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-specific content of an element.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text(TextPayload),
    Stroke(StrokePayload),
    Image(ImagePayload),
    Graph(GraphPayload),
    /// A kind this build does not understand, kept as raw JSON so it survives a save.
    Unknown { kind: String, data: serde_json::Value },
}

impl Payload {
    pub fn kind(&self) -> ElementKind {
        match self {
            Payload::Text(_) => ElementKind::Text,
            Payload::Stroke(_) => ElementKind::Stroke,
            Payload::Image(_) => ElementKind::Image,
            Payload::Graph(_) => ElementKind::Graph,
            Payload::Unknown { kind, .. } => ElementKind::Other(kind.clone()),
        }
    }

    /// Encode the payload body (without the kind tag).
    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            Payload::Text(p) => serde_json::to_value(p),
            Payload::Stroke(p) => serde_json::to_value(p),
            Payload::Image(p) => serde_json::to_value(p),
            Payload::Graph(p) => serde_json::to_value(p),
            Payload::Unknown { data, .. } => Ok(data.clone()),
        }
    }

    /// Decode a payload body given its kind tag.
    ///
    /// Unknown fields are ignored; unknown kinds are preserved as [`Payload::Unknown`].
    pub fn from_value(kind: &str, value: serde_json::Value) -> Result<Self, serde_json::Error> {
        Ok(match ElementKind::parse(kind) {
            ElementKind::Text => Payload::Text(serde_json::from_value(value)?),
            ElementKind::Stroke => Payload::Stroke(serde_json::from_value(value)?),
            ElementKind::Image => Payload::Image(serde_json::from_value(value)?),
            ElementKind::Graph => Payload::Graph(serde_json::from_value(value)?),
            ElementKind::Other(kind) => Payload::Unknown { kind, data: value },
        })
    }

    /// Natural size implied by the content, if the kind defines one.
    pub fn measure(&self) -> Option<Size> {
        match self {
            Payload::Text(p) => Some(p.measure()),
            Payload::Stroke(p) => Some(p.extent()),
            Payload::Image(p) => Some(p.natural_size()),
            Payload::Graph(_) => Some(GraphPayload::PANEL_SIZE),
            Payload::Unknown { .. } => None,
        }
    }
}

/// One item of canvas content.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: ElementId,
    /// Top-left of the bounding box, in canvas space.
    pub position: Point,
    size: Size,
    pub z_index: i64,
    /// Informational only.
    pub created_at: u64,
    pub payload: Payload,
}

impl Element {
    pub fn new(payload: Payload, position: Point, z_index: i64) -> Self {
        Self {
            id: ElementId::new(),
            position,
            size: Size::ZERO,
            z_index,
            created_at: now_millis(),
            payload,
        }
    }

    pub fn kind(&self) -> ElementKind {
        self.payload.kind()
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Set the size; negative or non-finite extents are stored as zero.
    pub fn set_size(&mut self, width: f64, height: f64) {
        let sanitize = |v: f64| if v.is_finite() && v > 0.0 { v } else { 0.0 };
        self.size = Size::new(sanitize(width), sanitize(height));
    }

    /// Size the element from its content metrics, where the kind defines them.
    pub fn fit_to_content(&mut self) {
        if let Some(size) = self.payload.measure() {
            self.set_size(size.width, size.height);
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    /// Closed-interval point containment. Zero-area elements never contain a point.
    pub fn contains_point(&self, point: Point) -> bool {
        if self.size.width <= 0.0 || self.size.height <= 0.0 {
            return false;
        }
        let b = self.bounds();
        point.x >= b.x0 && point.x <= b.x1 && point.y >= b.y0 && point.y <= b.y1
    }

    /// Strict intersection: boxes that only share an edge do not intersect.
    pub fn intersects_rect(&self, rect: Rect) -> bool {
        let b = self.bounds();
        b.x0 < rect.x1 && b.x1 > rect.x0 && b.y0 < rect.y1 && b.y1 > rect.y0
    }

    pub fn translate(&mut self, delta: Vec2) {
        if delta.x.is_finite() && delta.y.is_finite() {
            self.position += delta;
        }
    }
}
