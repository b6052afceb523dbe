//! # beacon-privacy
//!
//! Removes personally identifying keys from event properties before they are
//! persisted. Matching is on exact, case-sensitive key names at every level of
//! nested objects. Values are never inspected.

pub mod denylist;
pub mod engine;

pub use engine::{scrub_pii, PiiScrubber};
