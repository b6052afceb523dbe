//! Events enqueued, delivered, dropped; batches given up; retries; flushes.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Lock-free delivery counters, shared by every clone of a client.
#[derive(Debug, Default)]
pub struct DeliveryStats {
    events_enqueued: AtomicU64,
    events_delivered: AtomicU64,
    events_dropped: AtomicU64,
    batches_given_up: AtomicU64,
    retries: AtomicU64,
    flushes: AtomicU64,
}

/// Point-in-time copy of [`DeliveryStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryStatsSnapshot {
    pub events_enqueued: u64,
    pub events_delivered: u64,
    /// Events in batches rejected with a client error.
    pub events_dropped: u64,
    pub batches_given_up: u64,
    pub retries: u64,
    /// Flushes that found at least one queued event.
    pub flushes: u64,
}

impl DeliveryStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_enqueued(&self) {
        self.events_enqueued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delivered(&self, events: usize) {
        self.events_delivered
            .fetch_add(events as u64, Ordering::Relaxed);
    }

    pub fn record_dropped(&self, events: usize) {
        self.events_dropped.fetch_add(events as u64, Ordering::Relaxed);
    }

    pub fn record_given_up(&self) {
        self.batches_given_up.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_retries(&self, retries: u32) {
        self.retries.fetch_add(u64::from(retries), Ordering::Relaxed);
    }

    pub fn record_flush(&self) {
        self.flushes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DeliveryStatsSnapshot {
        DeliveryStatsSnapshot {
            events_enqueued: self.events_enqueued.load(Ordering::Relaxed),
            events_delivered: self.events_delivered.load(Ordering::Relaxed),
            events_dropped: self.events_dropped.load(Ordering::Relaxed),
            batches_given_up: self.batches_given_up.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            flushes: self.flushes.load(Ordering::Relaxed),
        }
    }
}
