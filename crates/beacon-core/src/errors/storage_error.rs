/// Errors raised by key-value storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("read failed for key {key}: {reason}")]
    ReadFailed { key: String, reason: String },

    #[error("write failed for key {key}: {reason}")]
    WriteFailed { key: String, reason: String },

    #[error("storage unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("corrupt value under key {key}: {reason}")]
    Corrupt { key: String, reason: String },
}
