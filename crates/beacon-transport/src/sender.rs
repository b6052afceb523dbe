//! One batch, one logical send: attempts, backoff sleeps, classification.

use beacon_core::models::Event;
use beacon_core::traits::{ITransport, SendOutcome};
use beacon_observability::events as log;

use crate::retry::RetryPolicy;

/// Final result of sending one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// The collector accepted the batch.
    Delivered { attempts: u32 },
    /// The collector rejected the batch with a client error. It is not
    /// resent and leaves the queue.
    Dropped { status: u16, attempts: u32 },
    /// Transient failures outlasted the retry budget. The batch stays queued.
    GaveUp { attempts: u32, reason: String },
}

impl BatchOutcome {
    /// Whether the batch should leave the queue.
    pub fn is_success(&self) -> bool {
        !matches!(self, BatchOutcome::GaveUp { .. })
    }

    /// Network calls made for this batch.
    pub fn attempts(&self) -> u32 {
        match self {
            BatchOutcome::Delivered { attempts }
            | BatchOutcome::Dropped { attempts, .. }
            | BatchOutcome::GaveUp { attempts, .. } => *attempts,
        }
    }

    /// Calls beyond the first.
    pub fn retries(&self) -> u32 {
        self.attempts().saturating_sub(1)
    }
}

/// Sends batches through a transport under a retry policy.
#[derive(Debug)]
pub struct BatchSender<T> {
    transport: T,
    policy: RetryPolicy,
}

impl<T: ITransport> BatchSender<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Send `events` as a fresh batch.
    pub async fn send(&self, events: &[Event]) -> BatchOutcome {
        self.send_from(events, 0).await
    }

    /// Send `events` as a batch that has already been retried `retry_count`
    /// times. Network and server errors wait out the backoff table and try
    /// again while the budget lasts; client errors are final at once.
    pub async fn send_from(&self, events: &[Event], mut retry_count: u32) -> BatchOutcome {
        let mut attempts = 0;
        loop {
            attempts += 1;
            let reason = match self.transport.send_batch(events).await {
                SendOutcome::Delivered { .. } => {
                    log::batch_delivered(events.len(), attempts);
                    return BatchOutcome::Delivered { attempts };
                }
                SendOutcome::ClientError { status } => {
                    log::batch_dropped(events.len(), status);
                    return BatchOutcome::Dropped { status, attempts };
                }
                SendOutcome::ServerError { status } => format!("HTTP {status}"),
                SendOutcome::NetworkError { reason } => reason,
            };

            if !self.policy.should_retry(retry_count) {
                log::batch_given_up(events.len(), attempts);
                return BatchOutcome::GaveUp { attempts, reason };
            }

            let delay = self.policy.delay_for(retry_count);
            retry_count += 1;
            log::retry_scheduled(
                retry_count,
                self.policy.max_retries(),
                u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                &reason,
            );
            tokio::time::sleep(delay).await;
        }
    }
}
