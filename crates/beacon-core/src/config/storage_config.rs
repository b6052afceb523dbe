use serde::{Deserialize, Serialize};

use super::defaults;
use crate::constants;

/// Which key-value backend persists client state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// JSON file on disk; survives restarts.
    File,
    /// Process memory only.
    Memory,
}

/// Storage subsystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Path of the state file for the file backend.
    pub path: String,
    /// Maximum events retained in the durable queue.
    pub max_queue_size: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: match defaults::DEFAULT_STORAGE_BACKEND {
                "memory" => StorageBackend::Memory,
                _ => StorageBackend::File,
            },
            path: defaults::DEFAULT_STORAGE_PATH.to_string(),
            max_queue_size: constants::MAX_QUEUE_SIZE,
        }
    }
}
