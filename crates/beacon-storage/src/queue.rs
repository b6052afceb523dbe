//! Durable, bounded FIFO of pending events.
//!
//! Every operation is a synchronous read-modify-write of one storage key,
//! serialized by an in-process lock, so concurrent callers within a process
//! never interleave inside an operation. Nothing here is held across an
//! await: the flush loop re-reads the queue after every network call.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use beacon_core::constants::MAX_QUEUE_SIZE;
use beacon_core::errors::{BeaconResult, StorageError};
use beacon_core::models::Event;
use beacon_core::traits::IKeyValueStore;
use beacon_observability::events as log;
use uuid::Uuid;

use crate::keys;

pub struct DurableQueue {
    store: Arc<dyn IKeyValueStore>,
    max_size: usize,
    guard: Mutex<()>,
}

impl DurableQueue {
    pub fn new(store: Arc<dyn IKeyValueStore>) -> Self {
        Self::with_capacity(store, MAX_QUEUE_SIZE)
    }

    pub fn with_capacity(store: Arc<dyn IKeyValueStore>, max_size: usize) -> Self {
        Self {
            store,
            max_size: max_size.max(1),
            guard: Mutex::new(()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.max_size
    }

    /// Append `event`, dropping the oldest entries beyond capacity.
    /// Returns the queue length after the append.
    pub fn enqueue(&self, event: Event) -> usize {
        self.locked(|| {
            let mut events = self.load();
            events.push(event);
            let dropped = truncate_front(&mut events, self.max_size);
            if dropped > 0 {
                log::queue_overflow(dropped, self.max_size);
            }
            self.save(&events);
            events.len()
        })
    }

    /// Snapshot of the queue in send order.
    pub fn read_all(&self) -> Vec<Event> {
        self.locked(|| self.load())
    }

    /// Overwrite the queue. Truncated to capacity, keeping the newest.
    pub fn replace(&self, mut events: Vec<Event>) {
        self.locked(|| {
            truncate_front(&mut events, self.max_size);
            self.save(&events);
        })
    }

    /// Remove the given events from the queue as it is now, keeping anything
    /// enqueued since they were read. Returns how many were removed.
    pub fn remove_delivered(&self, event_ids: &[Uuid]) -> usize {
        if event_ids.is_empty() {
            return 0;
        }
        let ids: HashSet<&Uuid> = event_ids.iter().collect();
        self.locked(|| {
            let mut events = self.load();
            let before = events.len();
            events.retain(|e| !ids.contains(&e.event_id));
            let removed = before - events.len();
            if removed > 0 {
                self.save(&events);
            }
            removed
        })
    }

    pub fn len(&self) -> usize {
        self.read_all().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.replace(Vec::new());
    }

    fn locked<T>(&self, f: impl FnOnce() -> T) -> T {
        // A poisoned guard protects no data of its own; keep going.
        let _guard = self.guard.lock().unwrap_or_else(|e| e.into_inner());
        f()
    }

    /// Read failures and corrupt data both read as an empty queue.
    fn load(&self) -> Vec<Event> {
        match self.try_load() {
            Ok(events) => events,
            Err(e) => {
                log::storage_degraded("queue", "read", &e.to_string());
                Vec::new()
            }
        }
    }

    fn try_load(&self) -> BeaconResult<Vec<Event>> {
        let Some(raw) = self.store.get(keys::QUEUE)? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&raw).map_err(|e| {
            StorageError::Corrupt {
                key: keys::QUEUE.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Write failures lose this write only.
    fn save(&self, events: &[Event]) {
        let result = serde_json::to_string(events)
            .map_err(Into::into)
            .and_then(|raw| self.store.set(keys::QUEUE, &raw));
        if let Err(e) = result {
            log::storage_degraded("queue", "write", &e.to_string());
        }
    }
}

fn truncate_front(events: &mut Vec<Event>, max: usize) -> usize {
    let excess = events.len().saturating_sub(max);
    if excess > 0 {
        events.drain(..excess);
    }
    excess
}
