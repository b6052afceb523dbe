/// Errors raised by the network transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("network error: {reason}")]
    NetworkError { reason: String },

    #[error("unexpected HTTP status {status}")]
    HttpStatus { status: u16 },

    #[error("response decode failed: {reason}")]
    DecodeFailed { reason: String },
}
