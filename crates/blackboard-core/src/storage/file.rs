//! File-based storage implementation for native platforms.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::document::BoardDocument;
use std::fs;
use std::path::{Path, PathBuf};

/// Stores each slot as a JSON file in a directory.
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a file storage rooted at `base_path`, creating the directory if needed.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Create file storage in the platform data directory.
    ///
    /// On Linux: `~/.local/share/blackboard/boards/`
    /// On Windows: `%LOCALAPPDATA%\blackboard\boards\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;

        Self::new(base.join("blackboard").join("boards"))
    }

    /// File path for a slot key.
    fn document_path(&self, key: &str) -> PathBuf {
        // Sanitize the key to be safe for filenames
        let safe_key: String = key
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{}.json", safe_key))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl Storage for FileStorage {
    fn save(&self, key: &str, document: &BoardDocument) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.document_path(key);
        let json = document.to_json();

        Box::pin(async move {
            let json = json?;
            fs::write(&path, json).map_err(|e| {
                StorageError::Io(format!("Failed to write {}: {}", path.display(), e))
            })
        })
    }

    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<BoardDocument>> {
        let path = self.document_path(key);
        let key = key.to_string();

        Box::pin(async move {
            if !path.exists() {
                return Err(StorageError::NotFound(key));
            }

            let json = fs::read_to_string(&path).map_err(|e| {
                StorageError::Io(format!("Failed to read {}: {}", path.display(), e))
            })?;

            BoardDocument::from_json(&json).map_err(|e| {
                StorageError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
            })
        })
    }

    fn delete(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.document_path(key);

        Box::pin(async move {
            if path.exists() {
                fs::remove_file(&path).map_err(|e| {
                    StorageError::Io(format!("Failed to delete {}: {}", path.display(), e))
                })?;
            }
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        let base = self.base_path.clone();

        Box::pin(async move {
            if !base.exists() {
                return Ok(vec![]);
            }

            let entries = fs::read_dir(&base)
                .map_err(|e| StorageError::Io(format!("Failed to read directory: {}", e)))?;

            let mut keys: Vec<String> = entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| path.extension().is_some_and(|e| e == "json"))
                .filter_map(|path| path.file_stem()?.to_str().map(str::to_string))
                .collect();
            keys.sort();
            Ok(keys)
        })
    }

    fn exists(&self, key: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let path = self.document_path(key);
        Box::pin(async move { Ok(path.exists()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Payload, StrokePayload, SerializableColor};
    use pollster::block_on;
    use crate::store::ElementStore;
    use kurbo::Point;
    use tempfile::tempdir;

    fn document() -> BoardDocument {
        let mut store = ElementStore::new();
        let (stroke, origin) = StrokePayload::from_absolute(
            &[Point::new(1.0, 1.0), Point::new(9.0, 4.0)],
            SerializableColor::black(),
            3.0,
        );
        store
            .add_element(Payload::Stroke(stroke), origin.x, origin.y)
            .fit_to_content();
        BoardDocument::from_store(&store).unwrap()
    }

    #[test]
    fn test_file_storage_save_load() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        let doc = document();

        block_on(storage.save("board-1", &doc)).unwrap();
        let loaded = block_on(storage.load("board-1")).unwrap();

        assert_eq!(loaded, doc);
    }

    #[test]
    fn test_file_storage_not_found() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        let result = block_on(storage.load("nonexistent"));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_file_storage_list_and_delete() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let doc = document();
        block_on(storage.save("doc1", &doc)).unwrap();
        block_on(storage.save("doc2", &doc)).unwrap();
        assert_eq!(block_on(storage.list()).unwrap(), vec!["doc1", "doc2"]);

        block_on(storage.delete("doc1")).unwrap();
        assert!(!block_on(storage.exists("doc1")).unwrap());
        assert!(block_on(storage.exists("doc2")).unwrap());
    }

    #[test]
    fn test_file_storage_sanitizes_key() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        let doc = document();

        block_on(storage.save("team/board:with*special", &doc)).unwrap();

        assert!(dir.path().join("team_board_with_special.json").exists());
        let loaded = block_on(storage.load("team/board:with*special")).unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn test_corrupt_file_reports_serialization_error() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        std::fs::write(dir.path().join("broken.json"), r#"{"version":"1.0"}"#).unwrap();

        let result = block_on(storage.load("broken"));
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }
}
