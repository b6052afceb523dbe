//! Error taxonomy. One enum per subsystem, wrapped by [`BeaconError`].
//!
//! None of these ever reach the host application: the client facade absorbs
//! them at its public boundary and logs them.

mod storage_error;
mod transport_error;

pub use storage_error::StorageError;
pub use transport_error::TransportError;

/// Top-level error for every fallible operation in the workspace.
#[derive(Debug, thiserror::Error)]
pub enum BeaconError {
    #[error("storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("transport error: {0}")]
    TransportError(#[from] TransportError),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("concurrency error: {0}")]
    ConcurrencyError(String),

    #[error("config error: {0}")]
    ConfigError(String),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Convenience alias used across the workspace.
pub type BeaconResult<T> = Result<T, BeaconError>;
