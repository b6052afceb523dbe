//! # beacon-session
//!
//! Identity for every event: a stable anonymous id, a session id that rotates
//! after inactivity, and an optional authenticated user id. All of it lives
//! in the injected key-value store so it survives restarts.

pub mod manager;

pub use manager::IdentityManager;
