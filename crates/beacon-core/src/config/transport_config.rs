use serde::{Deserialize, Serialize};

use super::defaults;
use crate::constants;

/// Collector endpoints and retry policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Base URL of the collector.
    pub base_url: String,
    /// Path that receives `POST { events }`.
    pub events_path: String,
    /// Path that serves the remote tracking config.
    pub config_path: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Backoff table in milliseconds, indexed by retry count.
    pub retry_delays_ms: Vec<u64>,
    /// Optional bearer token sent with every request.
    pub bearer_token: Option<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::DEFAULT_BASE_URL.to_string(),
            events_path: defaults::DEFAULT_EVENTS_PATH.to_string(),
            config_path: defaults::DEFAULT_CONFIG_PATH.to_string(),
            timeout_secs: defaults::DEFAULT_TIMEOUT_SECS,
            max_retries: constants::MAX_RETRIES,
            retry_delays_ms: constants::RETRY_DELAYS_MS.to_vec(),
            bearer_token: None,
        }
    }
}

impl TransportConfig {
    pub fn events_url(&self) -> String {
        join_url(&self.base_url, &self.events_path)
    }

    pub fn config_url(&self) -> String {
        join_url(&self.base_url, &self.config_path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
