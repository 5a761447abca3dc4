//! Connection configuration.

use std::time::Duration;

use kurier_common::Retry;
use kurier_protocol::frame::MAX_FRAME_SIZE;

/// Tunables for a broker connection.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Per-request deadline; the slot is removed and the send fails once it
    /// passes.
    pub response_timeout: Duration,
    /// Policy for (re)connect attempts.
    pub connect_retry: Retry,
    /// Largest response frame the reader will accept.
    pub max_frame_size: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            response_timeout: Duration::from_secs(60),
            connect_retry: Retry::backoff(Duration::from_millis(50))
                .with_max_delay(Duration::from_secs(5)),
            max_frame_size: MAX_FRAME_SIZE,
        }
    }
}
