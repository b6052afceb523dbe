use std::collections::HashMap;
use std::sync::RwLock;

use beacon_core::errors::{BeaconResult, StorageError};
use beacon_core::traits::IKeyValueStore;

/// In-memory key-value store. Used when persistent storage is unavailable,
/// and as the default double in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned(e: impl std::fmt::Display) -> StorageError {
    StorageError::Unavailable {
        reason: format!("memory store lock poisoned: {e}"),
    }
}

impl IKeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> BeaconResult<Option<String>> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> BeaconResult<()> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> BeaconResult<()> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.remove(key);
        Ok(())
    }

    fn set_many(&self, pairs: &[(&str, &str)]) -> BeaconResult<()> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        for (key, value) in pairs {
            entries.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }
}
