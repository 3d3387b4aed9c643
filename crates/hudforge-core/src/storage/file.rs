//! File-based storage implementation for native platforms.

use super::{ConfigStorage, StorageError, StorageResult};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Default file name of the config document.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Stores the config document as a pretty-printed JSON file.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Create a file storage writing to `path`.
    ///
    /// Parent directories are created on the first save.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Create file storage in the default location.
    ///
    /// On Unix: `~/.local/share/hudforge/config.json`
    /// On Windows: `%LOCALAPPDATA%\hudforge\config.json`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;

        Ok(Self::new(base.join("hudforge").join(CONFIG_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStorage for FileStorage {
    fn load(&self) -> StorageResult<Option<Value>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.path).map_err(|e| {
            StorageError::Io(format!("Failed to read {}: {}", self.path.display(), e))
        })?;

        serde_json::from_str(&json).map(Some).map_err(|e| {
            StorageError::Serialization(format!("Failed to parse {}: {}", self.path.display(), e))
        })
    }

    fn save(&self, document: &Value) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    StorageError::Io(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        let json = serde_json::to_string_pretty(document)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        fs::write(&self.path, json).map_err(|e| {
            StorageError::Io(format!("Failed to write {}: {}", self.path.display(), e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_file_storage_save_load() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested").join(CONFIG_FILE_NAME));

        let doc = json!({"modules": {"clock": {"enabled": true}}});
        storage.save(&doc).unwrap();

        assert_eq!(storage.load().unwrap(), Some(doc));
    }

    #[test]
    fn test_file_storage_missing_file() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join(CONFIG_FILE_NAME));

        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn test_file_storage_malformed_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "{ not json").unwrap();

        let result = FileStorage::new(path).load();
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }
}
