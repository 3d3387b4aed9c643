//! Storage abstraction for the persisted config document.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use memory::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Backend that reads and writes the config document.
///
/// Calls are synchronous; the registry invokes `save` right after every
/// persisted mutation.
pub trait ConfigStorage {
    /// Load the document. `Ok(None)` means nothing has been saved yet.
    fn load(&self) -> StorageResult<Option<Value>>;

    /// Replace the stored document.
    fn save(&self, document: &Value) -> StorageResult<()>;
}

impl<S: ConfigStorage + ?Sized> ConfigStorage for Arc<S> {
    fn load(&self) -> StorageResult<Option<Value>> {
        (**self).load()
    }

    fn save(&self, document: &Value) -> StorageResult<()> {
        (**self).save(document)
    }
}
