//! Versioned JSON document format for boards.
//!
//! ```json
//! { "version": "1.0", "savedAt": 1700000000000, "elementCount": 1,
//!   "elements": [ { "id": "...", "kind": "text", "x": 0, "y": 0,
//!                   "width": 10, "height": 10, "zIndex": 0, "payload": {} } ] }
//! ```

use crate::elements::{Element, ElementId, Payload, now_millis};
use crate::store::ElementStore;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// Document format version written by this crate.
pub const FORMAT_VERSION: &str = "1.0";

/// Errors reading or writing board documents.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Document has no elements array")]
    MissingElements,
    #[error("Element {index} is invalid: {reason}")]
    InvalidElement { index: usize, reason: String },
    #[error("Failed to access {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// One persisted element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementRecord {
    pub id: String,
    pub kind: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    /// Absent in documents saved before z-ordering existed.
    #[serde(default)]
    pub z_index: i64,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl ElementRecord {
    fn from_element(element: &Element) -> Result<Self, serde_json::Error> {
        let size = element.size();
        Ok(Self {
            id: element.id.to_string(),
            kind: element.kind().as_str().to_string(),
            x: element.position.x,
            y: element.position.y,
            width: size.width,
            height: size.height,
            z_index: element.z_index,
            payload: element.payload.to_value()?,
        })
    }

    fn to_element(&self, index: usize) -> Result<Element, DocumentError> {
        if !(self.x.is_finite() && self.y.is_finite()) {
            return Err(DocumentError::InvalidElement {
                index,
                reason: "non-finite position".to_string(),
            });
        }
        let payload = Payload::from_value(&self.kind, self.payload.clone()).map_err(|e| {
            DocumentError::InvalidElement {
                index,
                reason: format!("{} payload: {}", self.kind, e),
            }
        })?;
        let mut element = Element::new(payload, Point::new(self.x, self.y), self.z_index);
        element.id = ElementId::from(self.id.as_str());
        // Negative sizes clamp to zero
        element.set_size(self.width, self.height);
        Ok(element)
    }
}

/// A serialized board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardDocument {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub saved_at: u64,
    #[serde(default)]
    pub element_count: usize,
    pub elements: Vec<ElementRecord>,
}

impl BoardDocument {
    /// Snapshot the store in paint order.
    pub fn from_store(store: &ElementStore) -> Result<Self, DocumentError> {
        let elements = store
            .all_elements()
            .into_iter()
            .map(ElementRecord::from_element)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            version: FORMAT_VERSION.to_string(),
            saved_at: now_millis(),
            element_count: elements.len(),
            elements,
        })
    }

    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a document. `elements` must be present and be an array.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    pub fn from_value(mut value: serde_json::Value) -> Result<Self, DocumentError> {
        let Some(raw) = value.get_mut("elements").map(serde_json::Value::take) else {
            return Err(DocumentError::MissingElements);
        };
        let serde_json::Value::Array(entries) = raw else {
            return Err(DocumentError::MissingElements);
        };
        let elements = entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                serde_json::from_value::<ElementRecord>(entry).map_err(|e| {
                    DocumentError::InvalidElement {
                        index,
                        reason: e.to_string(),
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let field = |name: &str| value.get(name);
        Ok(Self {
            version: field("version")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            saved_at: field("savedAt").and_then(|v| v.as_u64()).unwrap_or_default(),
            element_count: field("elementCount")
                .and_then(|v| v.as_u64())
                .map_or(elements.len(), |n| n as usize),
            elements,
        })
    }

    /// Convert every record to an element, failing on the first invalid one.
    ///
    /// Later duplicates of an id receive fresh ids.
    pub fn to_elements(&self) -> Result<Vec<Element>, DocumentError> {
        let mut seen = HashSet::new();
        self.elements
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let mut element = record.to_element(index)?;
                if !seen.insert(element.id.clone()) {
                    let fresh = ElementId::new();
                    log::warn!("Duplicate element id {} replaced with {}", element.id, fresh);
                    element.id = fresh.clone();
                    seen.insert(fresh);
                }
                Ok(element)
            })
            .collect()
    }
}

/// Serialize the store.
pub fn serialize(store: &ElementStore) -> Result<BoardDocument, DocumentError> {
    BoardDocument::from_store(store)
}

/// Parse a document string.
pub fn deserialize(json: &str) -> Result<BoardDocument, DocumentError> {
    BoardDocument::from_json(json)
}

/// Replace the store contents with the document's elements.
///
/// Every record is validated before the store is touched, so a failed load
/// leaves the store unchanged. Returns the number of elements loaded.
pub fn load(store: &mut ElementStore, document: &BoardDocument) -> Result<usize, DocumentError> {
    let elements = document.to_elements()?;
    let count = elements.len();
    store.clear();
    for element in elements {
        store.insert_element(element, None);
    }
    store.resync_z_counter();
    log::info!("Loaded board with {} elements", count);
    Ok(count)
}

/// Write the store to a standalone file.
pub fn export_to_file(path: &Path, store: &ElementStore) -> Result<(), DocumentError> {
    let json = serialize(store)?.to_json()?;
    std::fs::write(path, json).map_err(|source| DocumentError::Io {
        path: path.display().to_string(),
        source,
    })?;
    log::info!("Exported board to {}", path.display());
    Ok(())
}

/// Load a standalone file into the store.
pub fn import_from_file(path: &Path, store: &mut ElementStore) -> Result<usize, DocumentError> {
    let json = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load(store, &deserialize(&json)?)
}
