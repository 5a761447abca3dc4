//! Shared types for the kurier Kafka client: the error enum, the result
//! alias, and the reconnect/retry policy.

pub mod error;
pub mod retry;

pub use error::{Error, Result};
pub use retry::Retry;
