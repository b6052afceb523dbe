/// Beacon client version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version of the event schema written into every event.
pub const SCHEMA_VERSION: u32 = 1;

/// Maximum number of events held in the durable queue. Oldest are dropped first.
pub const MAX_QUEUE_SIZE: usize = 500;

/// Maximum number of events sent in one network call.
pub const MAX_BATCH_SIZE: usize = 20;

/// Periodic flush interval.
pub const FLUSH_INTERVAL_MS: u64 = 45_000;

/// Longest accepted periodic flush interval.
pub const MAX_FLUSH_INTERVAL_MS: u64 = 24 * 60 * 60 * 1000;

/// A session rotates once it is older than this.
pub const SESSION_TIMEOUT_MS: i64 = 30 * 60 * 1000;

/// Retry attempts after the first send of a batch.
pub const MAX_RETRIES: u32 = 3;

/// Backoff table indexed by retry count. Indexes past the end use the last entry.
pub const RETRY_DELAYS_MS: [u64; 5] = [1_000, 2_000, 4_000, 8_000, 30_000];

/// Keys removed from event properties before they are persisted.
pub const PII_KEYS: [&str; 7] = [
    "email",
    "name",
    "phone",
    "password",
    "ssn",
    "credit_card",
    "address",
];

/// Internally generated event names.
pub const EVENT_SESSION_START: &str = "session_start";
pub const EVENT_SCREEN_VIEW: &str = "screen_view";

/// Role that is excluded from tracking when admin exclusion is on.
pub const ADMIN_ROLE: &str = "admin";
