use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A session tuple. Both fields are always replaced together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    /// Epoch milliseconds.
    pub session_start: i64,
}

impl Session {
    /// Start a fresh session at `now_ms`.
    pub fn start(now_ms: i64) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            session_start: now_ms,
        }
    }

    /// Whether the session has outlived `timeout_ms` at `now_ms`.
    pub fn is_expired(&self, now_ms: i64, timeout_ms: i64) -> bool {
        now_ms.saturating_sub(self.session_start) > timeout_ms
    }
}
