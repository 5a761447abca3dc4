//! Per-request codec context.
//!
//! An immutable bundle of the api version, correlation id, client id and
//! membership-encoder registry shared by one encode/decode pair. Derived
//! contexts share the registry and telemetry sink; the context handed to
//! decode must carry the api version used for encode.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::membership::{ConsumerEncoder, MembershipEncoder};

/// Sink for produce telemetry: message count, encoded payload bytes, and
/// bytes saved by compression.
pub type ProduceTelemetry = Arc<dyn Fn(usize, usize, i64) + Send + Sync>;

/// Context carried across a single request/response pair.
#[derive(Clone)]
pub struct RequestContext {
    pub api_version: Option<i16>,
    pub correlation_id: i32,
    pub client_id: Option<String>,
    /// Group coordination protocol type selecting the membership encoder
    pub protocol_type: Option<String>,
    encoders: Arc<HashMap<String, Arc<dyn MembershipEncoder>>>,
    on_produce: Option<ProduceTelemetry>,
}

impl RequestContext {
    /// A context with the default registry (the `"consumer"` protocol).
    pub fn new() -> Self {
        let mut encoders: HashMap<String, Arc<dyn MembershipEncoder>> = HashMap::new();
        encoders.insert("consumer".to_string(), Arc::new(ConsumerEncoder));
        Self {
            api_version: None,
            correlation_id: 0,
            client_id: None,
            protocol_type: None,
            encoders: Arc::new(encoders),
            on_produce: None,
        }
    }

    pub fn with_api_version(mut self, version: i16) -> Self {
        self.api_version = Some(version);
        self
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn with_protocol_type(mut self, protocol_type: impl Into<String>) -> Self {
        self.protocol_type = Some(protocol_type.into());
        self
    }

    /// Register (or replace) the encoder for a protocol type.
    pub fn with_encoder(
        mut self,
        protocol_type: impl Into<String>,
        encoder: Arc<dyn MembershipEncoder>,
    ) -> Self {
        let mut encoders = (*self.encoders).clone();
        encoders.insert(protocol_type.into(), encoder);
        self.encoders = Arc::new(encoders);
        self
    }

    /// Attach a produce telemetry sink, invoked once per Produce encode.
    pub fn with_produce_telemetry(mut self, sink: ProduceTelemetry) -> Self {
        self.on_produce = Some(sink);
        self
    }

    /// A copy of this context with the correlation id replaced; registry and
    /// telemetry sink are shared.
    pub fn with_correlation(&self, correlation_id: i32) -> Self {
        let mut derived = self.clone();
        derived.correlation_id = correlation_id;
        derived
    }

    /// Encoder for `protocol_type`, falling back to the context's own
    /// protocol type. `None` means pass blobs through as raw bytes.
    pub fn encoder_for(&self, protocol_type: Option<&str>) -> Option<Arc<dyn MembershipEncoder>> {
        let key = protocol_type.or(self.protocol_type.as_deref())?;
        self.encoders.get(key).cloned()
    }

    /// Report one encoded Produce request to the telemetry sink.
    pub fn record_produce(&self, message_count: usize, payload_bytes: usize, bytes_saved: i64) {
        if let Some(sink) = &self.on_produce {
            sink(message_count, payload_bytes, bytes_saved);
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("api_version", &self.api_version)
            .field("correlation_id", &self.correlation_id)
            .field("client_id", &self.client_id)
            .field("protocol_type", &self.protocol_type)
            .field("encoders", &self.encoders.keys().collect::<Vec<_>>())
            .finish()
    }
}
