//! # beacon-transport
//!
//! Delivery of event batches to the collector.
//!
//! ## Modules
//!
//! - `protocol`: request and response bodies
//! - `retry`: backoff table and retry budget
//! - `sender`: `BatchSender`, one batch with retries and outcome classification
//! - `http_client`: `HttpTransport`, the reqwest-backed `ITransport` (feature `http`)

#[cfg(feature = "http")]
pub mod http_client;
pub mod protocol;
pub mod retry;
pub mod sender;

#[cfg(feature = "http")]
pub use http_client::HttpTransport;
pub use protocol::{ConfigEnvelope, EventBatch};
pub use retry::RetryPolicy;
pub use sender::{BatchOutcome, BatchSender};
