//! Key-value persistence port.
//!
//! Identity, transcript, and preferences are each stored as one JSON string
//! under their own key. Writes are last-write-wins with no transaction across
//! keys.

use std::collections::HashMap;
use std::sync::Mutex;

use thiserror::Error;

/// Storage keys used by the session.
pub mod keys {
    pub const IDENTITY: &str = "smartie.identity";
    pub const TRANSCRIPT: &str = "smartie.transcript";
    pub const PREFERENCES: &str = "smartie.preferences";
}

/// Errors that can occur in storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt storage contents: {0}")]
    Corrupt(String),
}

/// Port for key-value persistence.
///
/// Methods are synchronous so that a transcript mutation and its persisted
/// form are updated in the same step.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a key. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store for tests and sessions that need no reload survival.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?
            .remove(key);
        Ok(())
    }
}
