//! # beacon-storage
//!
//! Persistence for client state.
//!
//! ## Modules
//!
//! - `keys`: persisted key names
//! - `memory_store`: process-local `IKeyValueStore`
//! - `file_store`: JSON-file `IKeyValueStore` that survives restarts
//! - `queue`: `DurableQueue`, the bounded FIFO of pending events

pub mod file_store;
pub mod keys;
pub mod memory_store;
pub mod queue;

use std::sync::Arc;

use beacon_core::config::{StorageBackend, StorageConfig};
use beacon_core::traits::IKeyValueStore;
use beacon_observability::events;

pub use file_store::FileStore;
pub use memory_store::MemoryStore;
pub use queue::DurableQueue;

/// Open the backend named by `config`.
///
/// A file store that cannot be opened degrades to a memory store so the client
/// keeps working, without continuity across restarts.
pub fn open_store(config: &StorageConfig) -> Arc<dyn IKeyValueStore> {
    match config.backend {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::File => match FileStore::open(&config.path) {
            Ok(store) => Arc::new(store),
            Err(e) => {
                events::storage_degraded("file_store", "open", &e.to_string());
                Arc::new(MemoryStore::new())
            }
        },
    }
}
