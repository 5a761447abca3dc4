//! SaslHandshake API types (API key 17, version 0)
//!
//! Only the handshake framing lives here; mechanism exchanges travel as raw
//! frames outside correlation tracking.

use kurier_common::Result;
use serde::{Deserialize, Serialize};

use crate::parser::{Decoder, Encoder};

/// SaslHandshake request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaslHandshakeRequest {
    /// Mechanism name, e.g. "PLAIN" or "GSSAPI"
    pub mechanism: String,
}

impl SaslHandshakeRequest {
    pub fn encode(&self, encoder: &mut Encoder, _version: i16) -> Result<()> {
        encoder.write_string(Some(&self.mechanism));
        Ok(())
    }
}

/// SaslHandshake response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaslHandshakeResponse {
    pub error_code: i16,
    /// Mechanisms the broker accepts
    pub mechanisms: Vec<String>,
}

impl SaslHandshakeResponse {
    pub fn decode(decoder: &mut Decoder, _version: i16) -> Result<Self> {
        let error_code = decoder.read_i16()?;
        let count = decoder.read_i32()?;
        let mut mechanisms = Vec::with_capacity(count.max(0) as usize);
        for _ in 0..count {
            mechanisms.push(decoder.read_string()?.unwrap_or_default());
        }
        Ok(SaslHandshakeResponse { error_code, mechanisms })
    }

    pub fn encode(&self, encoder: &mut Encoder, _version: i16) -> Result<()> {
        encoder.write_i16(self.error_code);
        encoder.write_string_array(&self.mechanisms);
        Ok(())
    }
}

/// Error codes for SaslHandshake
pub mod error_codes {
    pub const NONE: i16 = 0;
    pub const UNSUPPORTED_SASL_MECHANISM: i16 = 33;
    pub const ILLEGAL_SASL_STATE: i16 = 34;
}
