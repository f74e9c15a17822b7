//! Storage backend trait and implementations
//!
//! The store treats persistence as an opaque JSON document at a fixed path:
//! read-or-fail, ensure the parent directory, write.

use crate::error::{Error, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;

/// Trait for storage backend implementations
#[async_trait]
pub trait StorageBackend: Clone + Send + Sync + 'static {
    /// File extension for this storage format (e.g., "json")
    fn extension(&self) -> &str;

    /// Serialize a document to string
    fn serialize(&self, data: &Value) -> Result<String>;

    /// Deserialize a document from string
    fn deserialize(&self, content: &str) -> Result<Value>;

    /// Read and deserialize a document
    async fn read(&self, path: &Path) -> Result<Value> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::FileRead {
                path: path.to_path_buf(),
                source: e,
            })?;
        self.deserialize(&content)
    }

    /// Create a directory and all of its parents
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        tokio::fs::create_dir_all(path)
            .await
            .map_err(|e| Error::DirectoryCreate {
                path: path.to_path_buf(),
                source: e,
            })
    }

    /// Serialize and write a document
    ///
    /// Writes to a sibling temp file then renames it over the target, so a
    /// crash mid-write leaves either the old or the new document.
    async fn write(&self, path: &Path, data: &Value) -> Result<()> {
        let content = self.serialize(data)?;

        let file_name = path.file_name().ok_or_else(|| Error::FileWrite {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
        })?;
        let mut temp_filename = file_name.to_os_string();
        temp_filename.push(".tmp");
        let temp_path = path.with_file_name(temp_filename);

        tokio::fs::write(&temp_path, content)
            .await
            .map_err(|e| Error::FileWrite {
                path: temp_path.clone(),
                source: e,
            })?;

        tokio::fs::rename(&temp_path, path)
            .await
            .map_err(|e| Error::FileWrite {
                path: path.to_path_buf(),
                source: e,
            })
    }
}

// =============================================================================
// JSON Storage Implementation
// =============================================================================

/// JSON storage backend (default)
#[derive(Debug, Clone, Default)]
pub struct JsonStorage {
    /// Pretty print JSON output
    pretty: bool,
}

impl JsonStorage {
    /// Create a new JSON storage backend with pretty printing enabled
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// Create a compact JSON storage (no pretty printing)
    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

#[async_trait]
impl StorageBackend for JsonStorage {
    fn extension(&self) -> &str {
        "json"
    }

    fn serialize(&self, data: &Value) -> Result<String> {
        if self.pretty {
            serde_json::to_string_pretty(data).map_err(Error::from)
        } else {
            serde_json::to_string(data).map_err(Error::from)
        }
    }

    fn deserialize(&self, content: &str) -> Result<Value> {
        serde_json::from_str(content).map_err(|e| Error::Parse(e.to_string()))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_json_serialize_pretty() {
        let storage = JsonStorage::new();
        let text = storage.serialize(&json!({"work": {"shellCommand": "/bin/zsh"}})).unwrap();
        assert!(text.contains('\n'));
        assert!(text.contains("\"shellCommand\": \"/bin/zsh\""));
    }

    #[test]
    fn test_json_serialize_compact() {
        let storage = JsonStorage::compact();
        let text = storage.serialize(&json!({"a": {}, "b": {}})).unwrap();
        assert_eq!(text, r#"{"a":{},"b":{}}"#);
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let storage = JsonStorage::new();
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/profiles.json");
        let doc = json!({"home": {"cwd": "/home/me"}});

        storage.ensure_dir(path.parent().unwrap()).await.unwrap();
        storage.write(&path, &doc).await.unwrap();

        assert_eq!(storage.read(&path).await.unwrap(), doc);
        assert!(!dir.path().join("nested/profiles.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_read_nonexistent_file() {
        let storage = JsonStorage::new();
        let err = storage
            .read(Path::new("/nonexistent/profiles.json"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::FileRead { .. }));
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_read_corrupt_file() {
        let storage = JsonStorage::new();
        let dir = tempdir().unwrap();
        let path = dir.path().join("profiles.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = storage.read(&path).await.unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[tokio::test]
    async fn test_write_without_directory_fails() {
        let storage = JsonStorage::new();
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing/profiles.json");

        let err = storage.write(&path, &json!({})).await.unwrap_err();
        assert!(matches!(err, Error::FileWrite { .. }));
        assert!(err.is_persistence_error());
    }
}
