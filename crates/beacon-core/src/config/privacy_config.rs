use serde::{Deserialize, Serialize};

use super::defaults;

/// Privacy subsystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivacyConfig {
    /// Keys scrubbed in addition to the built-in PII list.
    pub extra_keys: Vec<String>,
    /// Also scrub objects nested inside arrays.
    pub scrub_arrays: bool,
}

impl Default for PrivacyConfig {
    fn default() -> Self {
        Self {
            extra_keys: Vec::new(),
            scrub_arrays: defaults::DEFAULT_SCRUB_ARRAYS,
        }
    }
}
