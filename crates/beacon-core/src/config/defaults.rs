// Single source of truth for all default values.

// --- Client ---
pub const DEFAULT_APP: &str = "meridian";
pub const DEFAULT_APP_VERSION: &str = "0.1.0";
pub const DEFAULT_BUILD: &str = "1";
pub const DEFAULT_PLATFORM: &str = "web";
pub const DEFAULT_LOCALE: &str = "en-US";
pub const DEFAULT_TIMEZONE: &str = "UTC";

// --- Transport ---
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_EVENTS_PATH: &str = "/v1/events";
pub const DEFAULT_CONFIG_PATH: &str = "/api/event-system-config/analytics-config";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// --- Scheduler ---
pub const DEFAULT_FLUSH_INTERVAL_SECS: u64 = 45;
pub const DEFAULT_SESSION_TIMEOUT_SECS: u64 = 1_800; // 30 minutes

// --- Storage ---
pub const DEFAULT_STORAGE_BACKEND: &str = "file";
pub const DEFAULT_STORAGE_PATH: &str = "beacon-state.json";

// --- Privacy ---
pub const DEFAULT_SCRUB_ARRAYS: bool = false;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = true;

// --- Remote config (permissive) ---
pub const DEFAULT_TRACKING_ENABLED: bool = true;
pub const DEFAULT_EXCLUDE_ADMIN_USERS: bool = true;

/// `prod` for release builds, `dev` otherwise.
pub fn default_env() -> &'static str {
    if cfg!(debug_assertions) {
        "dev"
    } else {
        "prod"
    }
}
