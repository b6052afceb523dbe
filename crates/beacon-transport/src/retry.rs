use std::time::Duration;

use beacon_core::config::TransportConfig;
use beacon_core::constants::{MAX_RETRIES, RETRY_DELAYS_MS};

/// Retry budget and backoff table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    delays: Vec<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(MAX_RETRIES, &RETRY_DELAYS_MS)
    }
}

impl RetryPolicy {
    /// An empty table falls back to the built-in one.
    pub fn new(max_retries: u32, delays_ms: &[u64]) -> Self {
        let table = if delays_ms.is_empty() {
            &RETRY_DELAYS_MS[..]
        } else {
            delays_ms
        };
        Self {
            max_retries,
            delays: table.iter().copied().map(Duration::from_millis).collect(),
        }
    }

    pub fn from_config(config: &TransportConfig) -> Self {
        Self::new(config.max_retries, &config.retry_delays_ms)
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Whether a batch that has already been retried `retry_count` times
    /// may be sent again.
    pub fn should_retry(&self, retry_count: u32) -> bool {
        retry_count < self.max_retries
    }

    /// Wait before retry number `retry_count + 1`. Past the end of the table
    /// the last entry applies.
    pub fn delay_for(&self, retry_count: u32) -> Duration {
        let index = usize::try_from(retry_count).unwrap_or(usize::MAX);
        self.delays
            .get(index)
            .or_else(|| self.delays.last())
            .copied()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_matches_constants() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries(), 3);
        assert_eq!(policy.delay_for(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
        assert_eq!(policy.delay_for(4), Duration::from_secs(30));
    }

    #[test]
    fn index_past_table_caps_at_last_entry() {
        let policy = RetryPolicy::new(10, &[10, 20]);
        assert_eq!(policy.delay_for(1), Duration::from_millis(20));
        assert_eq!(policy.delay_for(9), Duration::from_millis(20));
        assert_eq!(policy.delay_for(u32::MAX), Duration::from_millis(20));
    }

    #[test]
    fn empty_table_uses_builtin() {
        assert_eq!(RetryPolicy::new(3, &[]), RetryPolicy::default());
    }

    #[test]
    fn retry_budget() {
        let policy = RetryPolicy::default();
        assert!(policy.should_retry(0));
        assert!(policy.should_retry(2));
        assert!(!policy.should_retry(3));
        assert!(!RetryPolicy::new(0, &[1]).should_retry(0));
    }
}
