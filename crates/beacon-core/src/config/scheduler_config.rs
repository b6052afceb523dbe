use serde::{Deserialize, Serialize};

use super::defaults;
use crate::constants;

/// Flush cadence, batching, and session timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Periodic flush interval in seconds.
    pub flush_interval_secs: u64,
    /// Maximum events per network call. Reaching this queue length also triggers a flush.
    pub max_batch_size: usize,
    /// Session rotates once it is older than this.
    pub session_timeout_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            flush_interval_secs: defaults::DEFAULT_FLUSH_INTERVAL_SECS,
            max_batch_size: constants::MAX_BATCH_SIZE,
            session_timeout_secs: defaults::DEFAULT_SESSION_TIMEOUT_SECS,
        }
    }
}

impl SchedulerConfig {
    pub fn session_timeout_ms(&self) -> i64 {
        i64::try_from(self.session_timeout_secs.saturating_mul(1_000)).unwrap_or(i64::MAX)
    }
}
