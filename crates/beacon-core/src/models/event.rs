//! The telemetry event as persisted in the queue and sent on the wire.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::constants::SCHEMA_VERSION;

/// Free-form event properties.
pub type Properties = Map<String, Value>;

/// Static application identity, fixed at `init`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInfo {
    pub platform: String,
    pub app: String,
    pub app_version: String,
    pub build: String,
    pub env: String,
}

/// Ambient context attached to every event.
///
/// Caller overrides are flattened next to the well-known keys. Overrides that
/// name a well-known key replace its value instead of duplicating it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventContext {
    pub locale: String,
    pub timezone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EventContext {
    pub fn new(locale: impl Into<String>, timezone: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            timezone: timezone.into(),
            referrer: None,
            extra: Map::new(),
        }
    }

    pub fn with_referrer(mut self, referrer: Option<String>) -> Self {
        self.referrer = referrer;
        self
    }

    /// Merge caller overrides; later keys win, as with an object spread.
    pub fn with_overrides(mut self, overrides: Map<String, Value>) -> Self {
        for (key, value) in overrides {
            match key.as_str() {
                "locale" => {
                    if let Some(s) = value.as_str() {
                        self.locale = s.to_string();
                    }
                }
                "timezone" => {
                    if let Some(s) = value.as_str() {
                        self.timezone = s.to_string();
                    }
                }
                "referrer" => {
                    self.referrer = value.as_str().map(str::to_string);
                }
                _ => {
                    self.extra.insert(key, value);
                }
            }
        }
        self
    }
}

/// A single telemetry event. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub schema_version: u32,
    pub event_id: Uuid,
    pub event: String,
    #[serde(with = "iso_millis")]
    pub ts: DateTime<Utc>,
    pub anonymous_id: String,
    pub user_id: Option<String>,
    pub session_id: String,
    #[serde(flatten)]
    pub app: AppInfo,
    pub context: EventContext,
    pub properties: Properties,
}

/// Identity fields resolved for one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventIdentity {
    pub anonymous_id: String,
    pub user_id: Option<String>,
    pub session_id: String,
}

impl Event {
    /// Build a new event with a fresh id. `properties` must already be scrubbed.
    /// `ts` is truncated to the millisecond precision of the wire format.
    pub fn new(
        name: impl Into<String>,
        ts: DateTime<Utc>,
        identity: EventIdentity,
        app: AppInfo,
        context: EventContext,
        properties: Properties,
    ) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            event_id: Uuid::new_v4(),
            event: name.into(),
            ts: ts.trunc_subsecs(3),
            anonymous_id: identity.anonymous_id,
            user_id: identity.user_id,
            session_id: identity.session_id,
            app,
            context,
            properties,
        }
    }
}

/// RFC 3339 with millisecond precision and a `Z` suffix, e.g. `2024-05-01T12:00:00.000Z`.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
