use std::future::Future;

use crate::errors::BeaconResult;
use crate::models::{Event, RemoteConfig};

/// Result of a single delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// 2xx.
    Delivered { status: u16 },
    /// 4xx, or any other non-2xx, non-5xx status. Never retried.
    ClientError { status: u16 },
    /// 5xx.
    ServerError { status: u16 },
    /// No response at all.
    NetworkError { reason: String },
}

impl SendOutcome {
    /// Classify an HTTP status code. Status 0 means no response.
    pub fn from_status(status: u16) -> Self {
        match status {
            0 => SendOutcome::NetworkError {
                reason: "no response".to_string(),
            },
            200..=299 => SendOutcome::Delivered { status },
            500..=599 => SendOutcome::ServerError { status },
            _ => SendOutcome::ClientError { status },
        }
    }

    /// Network and server errors are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SendOutcome::ServerError { .. } | SendOutcome::NetworkError { .. }
        )
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, SendOutcome::Delivered { .. })
    }
}

/// Network edge of the client: batch delivery and remote config.
pub trait ITransport: Send + Sync + 'static {
    /// Perform one network call carrying `{ "events": events }`.
    fn send_batch(&self, events: &[Event]) -> impl Future<Output = SendOutcome> + Send;

    /// Fetch the remote tracking config. `Ok(None)` means the collector
    /// answered without a usable config.
    fn fetch_config(&self) -> impl Future<Output = BeaconResult<Option<RemoteConfig>>> + Send;
}

impl<T: ITransport> ITransport for std::sync::Arc<T> {
    fn send_batch(&self, events: &[Event]) -> impl Future<Output = SendOutcome> + Send {
        (**self).send_batch(events)
    }

    fn fetch_config(&self) -> impl Future<Output = BeaconResult<Option<RemoteConfig>>> + Send {
        (**self).fetch_config()
    }
}
