//! Blackboard Core Library
//!
//! Platform-agnostic scene model for the Blackboard canvas: typed elements,
//! the z-ordered element store, reversible commands, the view transform and
//! the persisted document format.

pub mod board;
pub mod camera;
pub mod clipboard;
pub mod config;
pub mod document;
pub mod elements;
pub mod history;
pub mod ingest;
pub mod storage;
pub mod store;

pub use board::Board;
pub use camera::Camera;
pub use clipboard::{ClipItem, ClipboardError};
pub use config::{BoardConfig, ConfigError};
pub use document::{BoardDocument, DocumentError, ElementRecord};
pub use elements::{
    Element, ElementId, ElementKind, GraphPayload, ImagePayload, Payload, SerializableColor,
    StrokePayload, TextPayload,
};
pub use history::{Command, History, Snapshot};
pub use ingest::{AiResponse, Segment, SegmentKind};
pub use storage::{AutoSaveManager, MemoryStorage, Storage, StorageError, StorageResult};
pub use store::{ElementStore, LayerChange, LayerMove};
