//! Persisted state keys. Values are plain strings; the queue is a JSON array.

pub const PREFIX: &str = "@beacon/analytics/";

pub const ANONYMOUS_ID: &str = "@beacon/analytics/anonymous_id";
pub const SESSION_ID: &str = "@beacon/analytics/session_id";
/// Epoch milliseconds as a decimal string.
pub const SESSION_START: &str = "@beacon/analytics/session_start";
pub const QUEUE: &str = "@beacon/analytics/queue";
pub const USER_ID: &str = "@beacon/analytics/user_id";
