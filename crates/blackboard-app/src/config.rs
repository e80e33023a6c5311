//! Application configuration.

use blackboard_core::config::parse_object;
use blackboard_core::{BoardConfig, ConfigError, SerializableColor};
use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Host-level settings. Partial JSON falls back to defaults field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub background_color: SerializableColor,
    pub selection_color: SerializableColor,
    pub pen_color: SerializableColor,
    pub pen_width: f64,
    /// Zoom change per wheel notch.
    pub zoom_step: f64,
    /// Directory for saved boards; the platform data dir when unset.
    pub storage_dir: Option<PathBuf>,
    pub board: BoardConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Blackboard".to_string(),
            width: 1280,
            height: 800,
            background_color: SerializableColor::new(250, 250, 250, 255),
            selection_color: SerializableColor::new(59, 130, 246, 255),
            pen_color: SerializableColor::black(),
            pen_width: 3.0,
            zoom_step: 0.1,
            storage_dir: None,
            board: BoardConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn viewport(&self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }

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
