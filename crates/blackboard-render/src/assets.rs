//! Decoded image cache keyed by element.
//!
//! Loads may complete in any order. A completion only touches its own entry
//! and is dropped if the element has left the store in the meantime.

use base64::{Engine, engine::general_purpose::STANDARD};
use blackboard_core::{ElementId, ElementStore, Payload};
use peniko::{Blob, ImageAlphaType, ImageData, ImageFormat};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Image asset errors.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Source is not a data URL")]
    NotEmbedded,
    #[error("Malformed data URL")]
    MalformedDataUrl,
    #[error("Invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Load state of one image.
#[derive(Debug, Clone)]
pub enum AssetState {
    Pending,
    Ready(Arc<ImageData>),
    Failed(String),
}

#[derive(Debug, Clone)]
struct AssetEntry {
    src: String,
    state: AssetState,
}

/// Decoded images for the image elements of a board.
#[derive(Debug, Default)]
pub struct AssetCache {
    entries: HashMap<ElementId, AssetEntry>,
}

impl AssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Register a load for `id`. Returns false if the same source is already known.
    pub fn request(&mut self, id: &ElementId, src: &str) -> bool {
        if self.entries.get(id).is_some_and(|e| e.src == src) {
            return false;
        }
        self.entries.insert(
            id.clone(),
            AssetEntry {
                src: src.to_string(),
                state: AssetState::Pending,
            },
        );
        true
    }

    /// Record the result of a load.
    ///
    /// Returns true when the entry changed and a redraw is due. Results for
    /// elements that no longer exist, or that were re-requested with another
    /// source, are discarded.
    pub fn complete(
        &mut self,
        store: &ElementStore,
        id: &ElementId,
        src: &str,
        result: Result<ImageData, AssetError>,
    ) -> bool {
        if !store.contains(id) {
            self.entries.remove(id);
            log::debug!("Dropping image load for removed element {}", id);
            return false;
        }
        let Some(entry) = self.entries.get_mut(id) else {
            return false;
        };
        if entry.src != src {
            return false;
        }
        entry.state = match result {
            Ok(image) => AssetState::Ready(Arc::new(image)),
            Err(e) => {
                log::warn!("Failed to load image for {}: {}", id, e);
                AssetState::Failed(e.to_string())
            }
        };
        true
    }

    pub fn state(&self, id: &ElementId) -> Option<&AssetState> {
        self.entries.get(id).map(|e| &e.state)
    }

    /// The decoded image, if ready.
    pub fn image(&self, id: &ElementId) -> Option<&Arc<ImageData>> {
        match self.state(id) {
            Some(AssetState::Ready(image)) => Some(image),
            _ => None,
        }
    }

    /// Request every image element and decode embedded sources in place.
    ///
    /// Returns the number of images that became ready or failed.
    pub fn load_embedded(&mut self, store: &ElementStore) -> usize {
        let mut settled = 0;
        for element in store.all_elements() {
            let Payload::Image(image) = &element.payload else {
                continue;
            };
            if !self.request(&element.id, &image.src) || !image.is_embedded() {
                continue;
            }
            let result = decode_data_url(&image.src);
            if self.complete(store, &element.id, &image.src, result) {
                settled += 1;
            }
        }
        settled
    }

    /// External sources still waiting for the host to fetch them.
    pub fn pending(&self) -> Vec<(ElementId, String)> {
        let mut pending: Vec<_> = self
            .entries
            .iter()
            .filter(|(_, e)| matches!(e.state, AssetState::Pending))
            .map(|(id, e)| (id.clone(), e.src.clone()))
            .collect();
        pending.sort();
        pending
    }

    /// Drop entries whose element is gone. Returns how many were removed.
    pub fn prune(&mut self, store: &ElementStore) -> usize {
        let before = self.entries.len();
        self.entries.retain(|id, _| store.contains(id));
        before - self.entries.len()
    }
}

/// Decode a `data:<mime>;base64,<payload>` URL.
pub fn decode_data_url(src: &str) -> Result<ImageData, AssetError> {
    let rest = src.strip_prefix("data:").ok_or(AssetError::NotEmbedded)?;
    let (header, payload) = rest.split_once(',').ok_or(AssetError::MalformedDataUrl)?;
    if !header.ends_with(";base64") {
        return Err(AssetError::MalformedDataUrl);
    }
    let bytes = STANDARD.decode(payload.trim())?;
    decode_bytes(&bytes)
}

/// Decode encoded image bytes into RGBA8.
pub fn decode_bytes(bytes: &[u8]) -> Result<ImageData, AssetError> {
    let decoded = image::load_from_memory(bytes)?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(ImageData {
        data: Blob::new(Arc::new(rgba.into_vec())),
        format: ImageFormat::Rgba8,
        width,
        height,
        alpha_type: ImageAlphaType::Alpha,
    })
}
