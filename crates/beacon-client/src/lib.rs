//! # beacon-client
//!
//! The public surface of the telemetry client. A [`Beacon`] handle captures
//! events, scrubs them, persists them in the durable queue, and delivers them
//! in batches from a background schedule and on host lifecycle signals.
//!
//! ```no_run
//! use beacon_client::Beacon;
//! use beacon_core::BeaconConfig;
//! use serde_json::json;
//!
//! # async fn run() -> beacon_core::BeaconResult<()> {
//! let beacon = Beacon::from_config(BeaconConfig::default())?;
//! beacon.init().await;
//! beacon.identify("user-42");
//! beacon.track("report_opened", json!({ "report": "weekly" }), Default::default());
//! beacon.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod facade;
pub mod lifecycle;
pub mod referrer;
pub mod scheduler;

pub use beacon_observability as observability;

pub use facade::Beacon;
pub use lifecycle::{LifecycleState, Visibility};
pub use referrer::ReferrerTracker;
