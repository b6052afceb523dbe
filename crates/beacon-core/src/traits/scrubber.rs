use serde_json::Value;

use crate::models::Properties;

/// Removes sensitive keys from event properties.
pub trait IScrubber: Send + Sync {
    /// Return a scrubbed deep copy. Non-object input yields an empty map.
    fn scrub(&self, properties: &Value) -> Properties;
}
