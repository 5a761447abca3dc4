//! Broker connection layer for the kurier Kafka client.
//!
//! A [`Connection`] owns one TCP socket to one broker and multiplexes any
//! number of concurrent requests over it by correlation id. Producers,
//! consumers and coordinators are built on top of this crate together with
//! the codec in `kurier-protocol`.
//!
//! ```rust,no_run
//! use kurier_client::{BrokerEndpoint, Connection, ConnectionConfig};
//! use kurier_protocol::api_versions_types::ApiVersionsRequest;
//! use kurier_protocol::Request;
//!
//! # async fn example() -> kurier_common::Result<()> {
//! let endpoint = BrokerEndpoint::from_addr("127.0.0.1:9092".parse().unwrap());
//! let connection = Connection::new(endpoint, ConnectionConfig::default());
//!
//! let response = connection.send(Request::ApiVersions(ApiVersionsRequest)).await?;
//! println!("broker speaks: {:?}", response);
//! connection.dispose().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connection;
pub mod endpoint;

pub use config::ConnectionConfig;
pub use connection::Connection;
pub use endpoint::BrokerEndpoint;

pub use kurier_common::{Error, Result, Retry};
