//! In-memory storage implementation.

use super::{ConfigStorage, StorageError, StorageResult};
use serde_json::Value;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// In-memory storage for testing and ephemeral use.
///
/// Counts successful saves, and can be told to fail writes so callers can
/// exercise the error path.
#[derive(Default)]
pub struct MemoryStorage {
    document: RwLock<Option<Value>>,
    saves: AtomicUsize,
    fail_saves: AtomicBool,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storage that already holds a document.
    pub fn with_document(document: Value) -> Self {
        Self {
            document: RwLock::new(Some(document)),
            ..Self::default()
        }
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Make every following save fail with an IO error.
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// The last saved document, if any.
    pub fn document(&self) -> Option<Value> {
        self.document.read().ok().and_then(|doc| doc.clone())
    }
}

impl ConfigStorage for MemoryStorage {
    fn load(&self) -> StorageResult<Option<Value>> {
        let doc = self
            .document
            .read()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        Ok(doc.clone())
    }

    fn save(&self, document: &Value) -> StorageResult<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StorageError::Io("Simulated write failure".to_string()));
        }
        let mut doc = self
            .document
            .write()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        *doc = Some(document.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_save_and_load() {
        let storage = MemoryStorage::new();
        assert!(storage.load().unwrap().is_none());

        storage.save(&json!({"settings": {}})).unwrap();
        assert_eq!(storage.load().unwrap(), Some(json!({"settings": {}})));
        assert_eq!(storage.save_count(), 1);
    }

    #[test]
    fn test_failed_save_keeps_previous() {
        let storage = MemoryStorage::with_document(json!({"a": 1}));
        storage.set_fail_saves(true);

        let result = storage.save(&json!({"a": 2}));
        assert!(matches!(result, Err(StorageError::Io(_))));
        assert_eq!(storage.document(), Some(json!({"a": 1})));
        assert_eq!(storage.save_count(), 0);
    }
}
