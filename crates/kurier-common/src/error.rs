//! Error types for kurier.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for kurier operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for kurier.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A read ran past the logical end of a buffer
    #[error("buffer under run: {0}")]
    BufferUnderRun(String),

    /// A message body did not match its checksum
    #[error("crc mismatch (stored crc = {stored}, computed crc = {computed})")]
    CrcMismatch { stored: u32, computed: u32 },

    /// The attributes byte selected a compression codec we do not speak
    #[error("unsupported compression codec: {0}")]
    UnsupportedCodec(i8),

    /// The requested api version is outside the covered range
    #[error("unsupported version {version} for api key {api_key}")]
    UnsupportedApiVersion { api_key: i16, version: i16 },

    /// Malformed or unexpected wire data
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Connecting to the broker gave up after retry exhaustion
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The broker closed the connection underneath us
    #[error("server disconnected")]
    ServerDisconnected,

    /// No response arrived before the per-request deadline
    #[error("request timed out after {elapsed:?}")]
    Timeout { elapsed: Duration },

    /// The caller's cancellation signal fired
    #[error("request canceled")]
    Canceled,

    /// The connection was disposed while the request was pending
    #[error("connection disposed")]
    Disposed,
}

impl Error {
    /// Whether retrying the operation could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Io(_)
                | Error::ConnectionFailed(_)
                | Error::ServerDisconnected
                | Error::Timeout { .. }
        )
    }

    /// Whether this error means the underlying connection is gone.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Error::Io(_) | Error::ConnectionFailed(_) | Error::ServerDisconnected | Error::Disposed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(Error::ServerDisconnected.is_retryable());
        assert!(Error::Timeout { elapsed: Duration::from_secs(1) }.is_retryable());
        assert!(!Error::Canceled.is_retryable());
        assert!(!Error::CrcMismatch { stored: 1, computed: 2 }.is_retryable());
        assert!(!Error::Disposed.is_retryable());
    }
}
