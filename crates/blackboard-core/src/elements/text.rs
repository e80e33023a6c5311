//! Text element content.

use super::SerializableColor;
use kurbo::Size;
use serde::{Deserialize, Serialize};

/// A block of text with pre-wrapped lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextPayload {
    /// The raw text content.
    pub text: String,
    /// Wrapped lines as laid out on the board.
    #[serde(default)]
    pub lines: Vec<String>,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    /// Line advance as a multiple of the font size.
    #[serde(default = "default_line_height")]
    pub line_height: f64,
    #[serde(default)]
    pub color: SerializableColor,
}

fn default_font_size() -> f64 {
    TextPayload::DEFAULT_FONT_SIZE
}

fn default_font_family() -> String {
    TextPayload::DEFAULT_FONT_FAMILY.to_string()
}

fn default_line_height() -> f64 {
    TextPayload::DEFAULT_LINE_HEIGHT
}

impl TextPayload {
    pub const DEFAULT_FONT_SIZE: f64 = 20.0;
    pub const DEFAULT_FONT_FAMILY: &'static str = "Caveat";
    pub const DEFAULT_LINE_HEIGHT: f64 = 1.2;

    /// Create text with one line per source line (no wrapping).
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let lines = split_lines(&text);
        Self {
            text,
            lines,
            font_size: Self::DEFAULT_FONT_SIZE,
            font_family: Self::DEFAULT_FONT_FAMILY.to_string(),
            line_height: Self::DEFAULT_LINE_HEIGHT,
            color: SerializableColor::black(),
        }
    }

    pub fn with_font_size(mut self, size: f64) -> Self {
        if size.is_finite() && size > 0.0 {
            self.font_size = size;
        }
        self
    }

    pub fn with_color(mut self, color: SerializableColor) -> Self {
        self.color = color;
        self
    }

    /// Average glyph advance relative to the font size.
    fn char_width_factor(&self) -> f64 {
        match self.font_family.as_str() {
            "Caveat" => 0.48,
            "monospace" => 0.6,
            _ => 0.55,
        }
    }

    /// Approximate advance width of a single line.
    pub fn line_width(&self, line: &str) -> f64 {
        line.chars().count() as f64 * self.font_size * self.char_width_factor()
    }

    /// Vertical advance between lines.
    pub fn line_advance(&self) -> f64 {
        self.font_size * self.line_height
    }

    /// Re-wrap the text greedily by words so that no line exceeds `max_width`.
    ///
    /// Words wider than `max_width` get a line of their own.
    pub fn wrap(&mut self, max_width: f64) {
        if !max_width.is_finite() || max_width <= 0.0 {
            self.lines = split_lines(&self.text);
            return;
        }
        let mut lines = Vec::new();
        for paragraph in self.text.split('\n') {
            let mut current = String::new();
            for word in paragraph.split_whitespace() {
                let candidate = if current.is_empty() {
                    word.to_string()
                } else {
                    format!("{current} {word}")
                };
                if !current.is_empty() && self.line_width(&candidate) > max_width {
                    lines.push(std::mem::take(&mut current));
                    current = word.to_string();
                } else {
                    current = candidate;
                }
            }
            lines.push(current);
        }
        self.lines = lines;
    }

    /// Approximate size of the laid-out lines.
    pub fn measure(&self) -> Size {
        let width = self
            .lines
            .iter()
            .map(|line| self.line_width(line))
            .fold(0.0, f64::max);
        let line_count = self.lines.len().max(1);
        Size::new(width, line_count as f64 * self.line_advance())
    }
}

fn split_lines(text: &str) -> Vec<String> {
    text.split('\n').map(str::to_string).collect()
}
