//! In-memory storage implementation.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::document::BoardDocument;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for tests, headless runs and the browser fallback.
#[derive(Default)]
pub struct MemoryStorage {
    documents: RwLock<HashMap<String, BoardDocument>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl Storage for MemoryStorage {
    fn save(&self, key: &str, document: &BoardDocument) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        let document = document.clone();
        Box::pin(async move {
            let mut docs = self.documents.write().map_err(lock_error)?;
            docs.insert(key, document);
            Ok(())
        })
    }

    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<BoardDocument>> {
        let key = key.to_string();
        Box::pin(async move {
            let docs = self.documents.read().map_err(lock_error)?;
            docs.get(&key)
                .cloned()
                .ok_or(StorageError::NotFound(key))
        })
    }

    fn delete(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        Box::pin(async move {
            let mut docs = self.documents.write().map_err(lock_error)?;
            docs.remove(&key);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let docs = self.documents.read().map_err(lock_error)?;
            let mut keys: Vec<String> = docs.keys().cloned().collect();
            keys.sort();
            Ok(keys)
        })
    }

    fn exists(&self, key: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let key = key.to_string();
        Box::pin(async move {
            let docs = self.documents.read().map_err(lock_error)?;
            Ok(docs.contains_key(&key))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pollster::block_on;
    use crate::store::ElementStore;
    use crate::elements::{Payload, TextPayload};

    fn document() -> BoardDocument {
        let mut store = ElementStore::new();
        store.add_element(Payload::Text(TextPayload::new("memo")), 1.0, 2.0);
        BoardDocument::from_store(&store).unwrap()
    }

    #[test]
    fn test_save_and_load() {
        let storage = MemoryStorage::new();
        let doc = document();

        block_on(storage.save("test", &doc)).unwrap();
        let loaded = block_on(storage.load("test")).unwrap();

        assert_eq!(doc, loaded);
    }

    #[test]
    fn test_not_found() {
        let storage = MemoryStorage::new();
        let result = block_on(storage.load("nonexistent"));

        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_exists_and_delete() {
        let storage = MemoryStorage::new();

        assert!(!block_on(storage.exists("test")).unwrap());
        block_on(storage.save("test", &document())).unwrap();
        assert!(block_on(storage.exists("test")).unwrap());
        block_on(storage.delete("test")).unwrap();
        block_on(storage.delete("test")).unwrap();
        assert!(!block_on(storage.exists("test")).unwrap());
    }

    #[test]
    fn test_list() {
        let storage = MemoryStorage::new();
        let doc = document();

        block_on(storage.save("doc2", &doc)).unwrap();
        block_on(storage.save("doc1", &doc)).unwrap();

        assert_eq!(block_on(storage.list()).unwrap(), vec!["doc1", "doc2"]);
    }
}
