//! Tunable behaviour of the board.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Board-level settings. Every field has a default, so partial JSON is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BoardConfig {
    /// Maximum number of undoable commands.
    pub max_undo_depth: usize,
    /// Minimum canvas-space displacement for a drag to become a Move command.
    pub drag_threshold: f64,
    /// Offset applied to duplicated elements.
    pub duplicate_offset: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub autosave_interval_secs: u64,
    /// Maximum width used when wrapping inserted text.
    pub text_wrap_width: f64,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            max_undo_depth: 50,
            drag_threshold: 5.0,
            duplicate_offset: 20.0,
            min_zoom: 0.1,
            max_zoom: 5.0,
            autosave_interval_secs: 30,
            text_wrap_width: 600.0,
        }
    }
}

/// Parse a config file body. The top level must be a JSON object, so a
/// positional array is rejected even though serde maps it onto a struct.
pub fn parse_object<T: DeserializeOwned>(json: &str) -> Result<T, ConfigError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if !value.is_object() {
        return Err(ConfigError::Parse(serde::de::Error::custom(
            "expected a JSON object",
        )));
    }
    Ok(serde_json::from_value(value)?)
}

impl BoardConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        parse_object(json)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }
}
