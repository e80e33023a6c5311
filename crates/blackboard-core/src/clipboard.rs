//! Clipboard transport format for copy/paste between boards.
//!
//! The wire format is a JSON array of `{kind, payload, x, y, width, height}`.
//! Ids and z-indices are not carried; pasting always assigns fresh ones.

use crate::elements::{Element, Payload};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("Invalid clipboard JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Clipboard entry {0} has non-finite geometry")]
    NonFinite(usize),
}

/// Wire representation of one copied element.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClipboardEntry {
    kind: String,
    #[serde(default)]
    payload: serde_json::Value,
    x: f64,
    y: f64,
    #[serde(default)]
    width: f64,
    #[serde(default)]
    height: f64,
}

/// A detached copy of an element's content and geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipItem {
    pub payload: Payload,
    pub position: Point,
    pub size: Size,
}

impl ClipItem {
    pub fn from_element(element: &Element) -> Self {
        Self {
            payload: element.payload.clone(),
            position: element.position,
            size: element.size(),
        }
    }
}

/// Encode clip items into the transport string.
pub fn encode(items: &[ClipItem]) -> Result<String, ClipboardError> {
    let entries = items
        .iter()
        .map(|item| {
            Ok(ClipboardEntry {
                kind: item.payload.kind().as_str().to_string(),
                payload: item.payload.to_value()?,
                x: item.position.x,
                y: item.position.y,
                width: item.size.width,
                height: item.size.height,
            })
        })
        .collect::<Result<Vec<_>, serde_json::Error>>()?;
    Ok(serde_json::to_string(&entries)?)
}

/// Decode the transport string. Any malformed entry rejects the whole batch.
pub fn decode(json: &str) -> Result<Vec<ClipItem>, ClipboardError> {
    let entries: Vec<ClipboardEntry> = serde_json::from_str(json)?;
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let finite = [entry.x, entry.y, entry.width, entry.height]
                .iter()
                .all(|v| v.is_finite());
            if !finite {
                return Err(ClipboardError::NonFinite(index));
            }
            Ok(ClipItem {
                payload: Payload::from_value(&entry.kind, entry.payload)?,
                position: Point::new(entry.x, entry.y),
                size: Size::new(entry.width.max(0.0), entry.height.max(0.0)),
            })
        })
        .collect()
}
