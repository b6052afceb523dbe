use serde::{Deserialize, Serialize};

use crate::config::defaults;

/// Tracking switches served by the collector at `init`.
///
/// Missing fields take the permissive defaults so telemetry degrades
/// gracefully instead of vanishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_exclude_admin")]
    pub exclude_admin_users_from_tracking: bool,
}

fn default_enabled() -> bool {
    defaults::DEFAULT_TRACKING_ENABLED
}

fn default_exclude_admin() -> bool {
    defaults::DEFAULT_EXCLUDE_ADMIN_USERS
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            exclude_admin_users_from_tracking: default_exclude_admin(),
        }
    }
}
