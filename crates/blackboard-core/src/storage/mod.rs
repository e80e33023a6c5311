//! Storage abstraction for persistence.

mod autosave;
mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use autosave::{
    AUTOSAVE_KEY, AutoSaveManager, DEFAULT_AUTOSAVE_INTERVAL_SECS, PlatformAutoSaveManager,
    PlatformStorage, create_autosave_manager, create_default_storage,
};
pub use memory::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

use crate::document::{BoardDocument, DocumentError};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Document not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Key-value slots holding board documents.
///
/// On native platforms, implementations must be Send + Sync.
/// On WASM, these bounds are relaxed since it's single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait Storage: Send + Sync {
    /// Write a document to a slot, replacing any previous contents.
    fn save(&self, key: &str, document: &BoardDocument) -> BoxFuture<'_, StorageResult<()>>;

    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<BoardDocument>>;

    /// Delete a slot. Deleting a missing slot is not an error.
    fn delete(&self, key: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all slot keys.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    fn exists(&self, key: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

/// Key-value slots holding board documents (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait Storage {
    fn save(&self, key: &str, document: &BoardDocument) -> BoxFuture<'_, StorageResult<()>>;
    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<BoardDocument>>;
    fn delete(&self, key: &str) -> BoxFuture<'_, StorageResult<()>>;
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;
    fn exists(&self, key: &str) -> BoxFuture<'_, StorageResult<bool>>;
}
