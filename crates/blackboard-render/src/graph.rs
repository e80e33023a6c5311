//! Function plot geometry.

use crate::expr::Expr;
use blackboard_core::GraphPayload;
use kurbo::{BezPath, Point, Rect};

/// Number of points the function is sampled at across the x range.
pub const GRAPH_SAMPLES: usize = 200;

/// Maps graph coordinates into a panel rectangle (y grows upward).
#[derive(Debug, Clone, Copy)]
pub struct PlotFrame {
    pub rect: Rect,
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
}

impl PlotFrame {
    /// `None` if the graph's axis bounds are unusable.
    pub fn new(graph: &GraphPayload, rect: Rect) -> Option<Self> {
        graph.has_valid_bounds().then_some(Self {
            rect,
            x_min: graph.x_min,
            x_max: graph.x_max,
            y_min: graph.y_min,
            y_max: graph.y_max,
        })
    }

    pub fn to_panel(&self, x: f64, y: f64) -> Point {
        Point::new(
            self.rect.x0 + (x - self.x_min) / (self.x_max - self.x_min) * self.rect.width(),
            self.rect.y1 - (y - self.y_min) / (self.y_max - self.y_min) * self.rect.height(),
        )
    }

    /// Axis lines through the origin, where the origin is in range.
    pub fn axes(&self) -> BezPath {
        let mut path = BezPath::new();
        if (self.y_min..=self.y_max).contains(&0.0) {
            path.move_to(self.to_panel(self.x_min, 0.0));
            path.line_to(self.to_panel(self.x_max, 0.0));
        }
        if (self.x_min..=self.x_max).contains(&0.0) {
            path.move_to(self.to_panel(0.0, self.y_min));
            path.line_to(self.to_panel(0.0, self.y_max));
        }
        path
    }

    /// The sampled curve, broken wherever the value is not finite or leaves
    /// the y range. Each returned path is one continuous run.
    pub fn curve(&self, expr: &Expr) -> Vec<BezPath> {
        let mut runs = Vec::new();
        let mut current: Option<BezPath> = None;
        let step = (self.x_max - self.x_min) / (GRAPH_SAMPLES - 1) as f64;

        for i in 0..GRAPH_SAMPLES {
            let x = self.x_min + step * i as f64;
            let y = expr.eval(x);
            if !y.is_finite() || y < self.y_min || y > self.y_max {
                runs.extend(current.take());
                continue;
            }
            let point = self.to_panel(x, y);
            match current.as_mut() {
                Some(path) => path.line_to(point),
                None => {
                    let mut path = BezPath::new();
                    path.move_to(point);
                    current = Some(path);
                }
            }
        }
        runs.extend(current);
        runs
    }
}
