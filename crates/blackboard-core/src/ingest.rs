//! Turning collaborator output into board elements.
//!
//! Segment producers (document analysis) and the assistant hand over already
//! parsed data; this module only maps it onto elements.

use crate::elements::{ElementId, GraphPayload, ImagePayload, Payload, TextPayload};
use crate::store::ElementStore;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Vertical gap between an answer's text and its graph.
pub const GRAPH_GAP: f64 = 20.0;

/// Region type reported by a segment producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Text,
    Image,
    Graphic,
}

/// A rectangle cut from a source page, with its content.
///
/// Text payloads are either a string or a text object; image and graphic
/// payloads are either a source string or an image object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub kind: SegmentKind,
    pub x: f64,
    pub y: f64,
    #[serde(rename = "w")]
    pub width: f64,
    #[serde(rename = "h")]
    pub height: f64,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl Segment {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    fn is_finite(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
    }

    /// Element payload for this segment.
    pub fn to_payload(&self) -> Result<Payload, serde_json::Error> {
        Ok(match (self.kind, &self.payload) {
            (SegmentKind::Text, serde_json::Value::String(text)) => {
                Payload::Text(TextPayload::new(text.as_str()))
            }
            (SegmentKind::Text, value) => Payload::Text(serde_json::from_value(value.clone())?),
            (_, serde_json::Value::String(src)) => {
                Payload::Image(ImagePayload::new(src.as_str(), self.width, self.height))
            }
            (_, value) => Payload::Image(serde_json::from_value(value.clone())?),
        })
    }
}

/// Insert segments at `origin + (x, y)`, sized from their rectangles.
///
/// Invalid segments are skipped with a warning. Returns the new ids in order.
pub fn ingest_segments(store: &mut ElementStore, segments: &[Segment], origin: Point) -> Vec<ElementId> {
    let mut ids = Vec::with_capacity(segments.len());
    for (index, segment) in segments.iter().enumerate() {
        if !segment.is_finite() {
            log::warn!("Skipping segment {}: non-finite geometry", index);
            continue;
        }
        let payload = match segment.to_payload() {
            Ok(payload) => payload,
            Err(e) => {
                log::warn!("Skipping segment {}: {}", index, e);
                continue;
            }
        };
        let rect = segment.rect().abs();
        let at = origin + rect.origin().to_vec2();
        let element = store.add_element(payload, at.x, at.y);
        element.set_size(rect.width(), rect.height());
        ids.push(element.id.clone());
    }
    log::debug!("Ingested {} of {} segments", ids.len(), segments.len());
    ids
}

/// A parsed assistant answer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiResponse {
    pub content: String,
    #[serde(default)]
    pub has_graph: bool,
    #[serde(default)]
    pub graph_data: Option<GraphPayload>,
}

impl AiResponse {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Graph to plot, if the answer has one.
    pub fn graph(&self) -> Option<&GraphPayload> {
        self.graph_data.as_ref().filter(|_| self.has_graph)
    }
}

/// Insert an answer as a wrapped text element, with its graph below.
///
/// Empty content produces no text element. Returns the new ids.
pub fn ingest_ai_response(
    store: &mut ElementStore,
    response: &AiResponse,
    at: Point,
    wrap_width: f64,
) -> Vec<ElementId> {
    let mut ids = Vec::new();
    let mut cursor = at;

    if !response.content.trim().is_empty() {
        let mut text = TextPayload::new(response.content.as_str());
        text.wrap(wrap_width);
        let element = store.add_element(Payload::Text(text), cursor.x, cursor.y);
        element.fit_to_content();
        cursor += Vec2::new(0.0, element.size().height + GRAPH_GAP);
        ids.push(element.id.clone());
    }

    if let Some(graph) = response.graph() {
        if !graph.has_valid_bounds() {
            log::warn!("Graph '{}' has unusable axis bounds", graph.expression);
        }
        let element = store.add_element(Payload::Graph(graph.clone()), cursor.x, cursor.y);
        element.fit_to_content();
        ids.push(element.id.clone());
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::ElementKind;
    use kurbo::Size;

    #[test]
    fn test_segments_become_elements() {
        let segments: Vec<Segment> = serde_json::from_value(serde_json::json!([
            { "kind": "text", "x": 10, "y": 20, "w": 200, "h": 40, "payload": "Theorem 1" },
            { "kind": "graphic", "x": 10, "y": 80, "w": 120, "h": 90, "payload": "data:image/png;base64,AA" },
            { "kind": "image", "x": 0, "y": 0, "w": 50, "h": 50,
              "payload": { "src": "p.png", "naturalWidth": 500, "naturalHeight": 500 } }
        ]))
        .unwrap();

        let mut store = ElementStore::new();
        let ids = ingest_segments(&mut store, &segments, Point::new(100.0, 100.0));
        assert_eq!(ids.len(), 3);

        let text = store.element(&ids[0]).unwrap();
        assert_eq!(text.kind(), ElementKind::Text);
        assert_eq!(text.position, Point::new(110.0, 120.0));
        assert_eq!(text.size(), Size::new(200.0, 40.0));

        let graphic = store.element(&ids[1]).unwrap();
        assert_eq!(graphic.kind(), ElementKind::Image);
        match &graphic.payload {
            Payload::Image(img) => assert_eq!(img.natural_size(), Size::new(120.0, 90.0)),
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_invalid_segments_skipped() {
        let segments = vec![
            Segment {
                kind: SegmentKind::Text,
                x: f64::NAN,
                y: 0.0,
                width: 1.0,
                height: 1.0,
                payload: serde_json::json!("x"),
            },
            Segment {
                kind: SegmentKind::Image,
                x: 0.0,
                y: 0.0,
                width: 1.0,
                height: 1.0,
                payload: serde_json::json!(42),
            },
        ];
        let mut store = ElementStore::new();
        assert!(ingest_segments(&mut store, &segments, Point::ZERO).is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn test_ai_response_with_graph() {
        let response = AiResponse::from_json(
            r##"{"content":"The sine wave","hasGraph":true,
                "graphData":{"expression":"sin(x)","xMin":-6,"xMax":6,"yMin":-2,"yMax":2,"color":"#ff0000"}}"##,
        )
        .unwrap();
        let mut store = ElementStore::new();
        let ids = ingest_ai_response(&mut store, &response, Point::new(50.0, 50.0), 600.0);
        assert_eq!(ids.len(), 2);

        let text = store.element(&ids[0]).unwrap();
        let graph = store.element(&ids[1]).unwrap();
        assert_eq!(graph.kind(), ElementKind::Graph);
        assert_eq!(graph.size(), GraphPayload::PANEL_SIZE);
        assert_eq!(graph.position.y, 50.0 + text.size().height + GRAPH_GAP);
        assert!(graph.z_index > text.z_index);
    }

    #[test]
    fn test_graph_ignored_without_flag() {
        let response = AiResponse {
            content: "Just text".to_string(),
            has_graph: false,
            graph_data: Some(GraphPayload::new("x")),
        };
        let mut store = ElementStore::new();
        let ids = ingest_ai_response(&mut store, &response, Point::ZERO, 600.0);
        assert_eq!(ids.len(), 1);
        assert_eq!(store.element(&ids[0]).unwrap().kind(), ElementKind::Text);
    }
}
