//! Wire bodies exchanged with the collector.

use std::borrow::Cow;

use beacon_core::errors::{BeaconResult, TransportError};
use beacon_core::models::{Event, RemoteConfig};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of a batch delivery: `{ "events": [...] }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventBatch<'a> {
    pub events: Cow<'a, [Event]>,
}

impl<'a> EventBatch<'a> {
    pub fn new(events: &'a [Event]) -> Self {
        Self {
            events: Cow::Borrowed(events),
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Envelope of the remote config response: `{ success, data }`.
///
/// `data` is kept loose so a partially valid payload still yields a config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<Value>,
}

impl ConfigEnvelope {
    /// Decode a response body. A body that is not an envelope is an error;
    /// an envelope without usable data is `Ok(None)`.
    pub fn parse(body: &[u8]) -> BeaconResult<Option<RemoteConfig>> {
        let envelope: Self =
            serde_json::from_slice(body).map_err(|e| TransportError::DecodeFailed {
                reason: e.to_string(),
            })?;
        Ok(envelope.into_config())
    }

    /// Only an explicit `false` turns a switch off. Anything else, including
    /// a missing field or a value of the wrong type, keeps the permissive default.
    pub fn into_config(self) -> Option<RemoteConfig> {
        if !self.success {
            return None;
        }
        let data = self.data?;
        let data = data.as_object()?;
        let is_off = |key: &str| matches!(data.get(key), Some(Value::Bool(false)));
        Some(RemoteConfig {
            enabled: !is_off("enabled"),
            exclude_admin_users_from_tracking: !is_off("excludeAdminUsersFromTracking"),
        })
    }
}
