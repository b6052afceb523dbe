//! # beacon-observability
//!
//! Structured tracing setup, one log function per notable occurrence in the
//! delivery pipeline, and lock-free delivery counters.

pub mod metrics;
pub mod tracing_setup;

pub use metrics::{DeliveryStats, DeliveryStatsSnapshot};
pub use tracing_setup::{events, init_tracing, init_tracing_from_config, init_tracing_with_filter};
