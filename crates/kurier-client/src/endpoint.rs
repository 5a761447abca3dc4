//! Broker endpoint identity.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::net::SocketAddr;

/// An equatable broker address.
///
/// DNS resolution happens outside this crate; an endpoint pairs the
/// resolved socket address with the name it resolved from. Equality and
/// hashing follow the address so two names for one broker share a
/// connection identity.
#[derive(Debug, Clone)]
pub struct BrokerEndpoint {
    host: String,
    address: SocketAddr,
}

impl BrokerEndpoint {
    pub fn new(host: impl Into<String>, address: SocketAddr) -> Self {
        Self { host: host.into(), address }
    }

    /// An endpoint known only by its address.
    pub fn from_addr(address: SocketAddr) -> Self {
        Self { host: address.ip().to_string(), address }
    }

    /// The DNS-safe name this endpoint resolved from.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }
}

impl PartialEq for BrokerEndpoint {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
    }
}

impl Eq for BrokerEndpoint {}

impl Hash for BrokerEndpoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address.hash(state);
    }
}

impl fmt::Display for BrokerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.address.port())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_follows_the_address() {
        let address: SocketAddr = "10.0.0.1:9092".parse().unwrap();
        let by_name = BrokerEndpoint::new("broker-0.cluster", address);
        let by_addr = BrokerEndpoint::from_addr(address);
        assert_eq!(by_name, by_addr);

        let other = BrokerEndpoint::new("broker-0.cluster", "10.0.0.2:9092".parse().unwrap());
        assert_ne!(by_name, other);
    }

    #[test]
    fn display_uses_host_and_port() {
        let endpoint =
            BrokerEndpoint::new("broker-0.cluster", "10.0.0.1:9092".parse().unwrap());
        assert_eq!(endpoint.to_string(), "broker-0.cluster:9092");
    }
}
