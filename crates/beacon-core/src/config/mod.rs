//! Configuration. Every section deserializes with defaults for missing keys,
//! so a partial TOML file is always valid input.

pub mod client_config;
pub mod defaults;
pub mod observability_config;
pub mod privacy_config;
pub mod scheduler_config;
pub mod storage_config;
pub mod transport_config;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use client_config::ClientConfig;
pub use observability_config::ObservabilityConfig;
pub use privacy_config::PrivacyConfig;
pub use scheduler_config::SchedulerConfig;
pub use storage_config::{StorageBackend, StorageConfig};
pub use transport_config::TransportConfig;

use crate::constants::MAX_FLUSH_INTERVAL_MS;
use crate::errors::{BeaconError, BeaconResult};

/// Aggregate configuration for a Beacon client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BeaconConfig {
    pub client: ClientConfig,
    pub transport: TransportConfig,
    pub scheduler: SchedulerConfig,
    pub storage: StorageConfig,
    pub privacy: PrivacyConfig,
    pub observability: ObservabilityConfig,
}

impl BeaconConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(toml_str: &str) -> BeaconResult<Self> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| BeaconError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> BeaconResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| BeaconError::ConfigError(format!("{}: {e}", path.display())))?;
        Self::from_toml(&raw)
    }

    /// Reject settings the client cannot run with.
    pub fn validate(&self) -> BeaconResult<()> {
        if self.transport.base_url.trim().is_empty() {
            return Err(BeaconError::ConfigError("transport.base_url is empty".into()));
        }
        if self.transport.retry_delays_ms.is_empty() {
            return Err(BeaconError::ConfigError(
                "transport.retry_delays_ms must have at least one entry".into(),
            ));
        }
        if self.scheduler.max_batch_size == 0 {
            return Err(BeaconError::ConfigError(
                "scheduler.max_batch_size must be positive".into(),
            ));
        }
        if self.storage.max_queue_size == 0 {
            return Err(BeaconError::ConfigError(
                "storage.max_queue_size must be positive".into(),
            ));
        }
        if self.scheduler.max_batch_size > self.storage.max_queue_size {
            return Err(BeaconError::ConfigError(format!(
                "scheduler.max_batch_size ({}) exceeds storage.max_queue_size ({})",
                self.scheduler.max_batch_size, self.storage.max_queue_size
            )));
        }
        if self.scheduler.flush_interval_secs == 0 {
            return Err(BeaconError::ConfigError(
                "scheduler.flush_interval_secs must be positive".into(),
            ));
        }
        if self.scheduler.flush_interval_secs > MAX_FLUSH_INTERVAL_MS / 1000 {
            return Err(BeaconError::ConfigError(format!(
                "scheduler.flush_interval_secs must be at most {}",
                MAX_FLUSH_INTERVAL_MS / 1000
            )));
        }
        Ok(())
    }
}
