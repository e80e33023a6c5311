//! Function plot content.

use super::SerializableColor;
use kurbo::Size;
use serde::{Deserialize, Serialize};

/// A plot of `y = f(x)` over fixed axis bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphPayload {
    pub expression: String,
    #[serde(default = "default_min")]
    pub x_min: f64,
    #[serde(default = "default_max")]
    pub x_max: f64,
    #[serde(default = "default_min")]
    pub y_min: f64,
    #[serde(default = "default_max")]
    pub y_max: f64,
    #[serde(default = "default_color")]
    pub color: SerializableColor,
}

fn default_min() -> f64 {
    -10.0
}

fn default_max() -> f64 {
    10.0
}

fn default_color() -> SerializableColor {
    GraphPayload::DEFAULT_COLOR
}

impl GraphPayload {
    /// Fixed size of a graph panel on the board.
    pub const PANEL_SIZE: Size = Size::new(400.0, 300.0);
    pub const DEFAULT_COLOR: SerializableColor = SerializableColor {
        r: 37,
        g: 99,
        b: 235,
        a: 255,
    };

    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            x_min: default_min(),
            x_max: default_max(),
            y_min: default_min(),
            y_max: default_max(),
            color: Self::DEFAULT_COLOR,
        }
    }

    pub fn with_bounds(mut self, x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        self.x_min = x_min;
        self.x_max = x_max;
        self.y_min = y_min;
        self.y_max = y_max;
        self
    }

    /// Axis ranges are usable only when finite and non-empty.
    pub fn has_valid_bounds(&self) -> bool {
        [self.x_min, self.x_max, self.y_min, self.y_max]
            .iter()
            .all(|v| v.is_finite())
            && self.x_max > self.x_min
            && self.y_max > self.y_min
    }
}
