use beacon_core::config::PrivacyConfig;
use beacon_core::models::Properties;
use beacon_core::traits::IScrubber;
use serde_json::{Map, Value};

use crate::denylist::Denylist;

/// Recursive key scrubber.
///
/// By default arrays are copied untouched, so a denylisted key inside an
/// object inside an array survives. Enable `scrub_arrays` to descend into
/// arrays as well.
#[derive(Debug, Clone, Default)]
pub struct PiiScrubber {
    denylist: Denylist,
    scrub_arrays: bool,
}

impl PiiScrubber {
    /// Scrubber with the built-in keys and no array descent.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &PrivacyConfig) -> Self {
        Self {
            denylist: Denylist::with_extra(&config.extra_keys),
            scrub_arrays: config.scrub_arrays,
        }
    }

    pub fn with_scrub_arrays(mut self, scrub_arrays: bool) -> Self {
        self.scrub_arrays = scrub_arrays;
        self
    }

    pub fn denylist(&self) -> &Denylist {
        &self.denylist
    }

    fn scrub_map(&self, map: &Map<String, Value>) -> Map<String, Value> {
        map.iter()
            .filter(|(key, _)| !self.denylist.contains(key))
            .map(|(key, value)| (key.clone(), self.scrub_value(value)))
            .collect()
    }

    fn scrub_value(&self, value: &Value) -> Value {
        match value {
            Value::Object(map) => Value::Object(self.scrub_map(map)),
            Value::Array(items) if self.scrub_arrays => {
                Value::Array(items.iter().map(|v| self.scrub_value(v)).collect())
            }
            other => other.clone(),
        }
    }
}

impl IScrubber for PiiScrubber {
    fn scrub(&self, properties: &Value) -> Properties {
        match properties {
            Value::Object(map) => self.scrub_map(map),
            Value::Null => Map::new(),
            other => {
                tracing::debug!(
                    kind = value_kind(other),
                    "privacy: non-object properties replaced with empty object"
                );
                Map::new()
            }
        }
    }
}

/// Scrub with the built-in denylist.
pub fn scrub_pii(properties: &Value) -> Properties {
    PiiScrubber::new().scrub(properties)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
