//! FindCoordinator API types (API key 10, version 0)

use kurier_common::Result;
use serde::{Deserialize, Serialize};

use crate::parser::{Decoder, Encoder};

/// FindCoordinator request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindCoordinatorRequest {
    /// The group whose coordinator to locate
    pub group_id: String,
}

impl FindCoordinatorRequest {
    pub fn encode(&self, encoder: &mut Encoder, _version: i16) -> Result<()> {
        encoder.write_string(Some(&self.group_id));
        Ok(())
    }
}

/// FindCoordinator response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindCoordinatorResponse {
    pub error_code: i16,
    pub coordinator_id: i32,
    pub host: String,
    pub port: i32,
}

impl FindCoordinatorResponse {
    pub fn decode(decoder: &mut Decoder, _version: i16) -> Result<Self> {
        let error_code = decoder.read_i16()?;
        let coordinator_id = decoder.read_i32()?;
        let host = decoder.read_string()?.unwrap_or_default();
        let port = decoder.read_i32()?;
        Ok(FindCoordinatorResponse { error_code, coordinator_id, host, port })
    }

    pub fn encode(&self, encoder: &mut Encoder, _version: i16) -> Result<()> {
        encoder.write_i16(self.error_code);
        encoder.write_i32(self.coordinator_id);
        encoder.write_string(Some(&self.host));
        encoder.write_i32(self.port);
        Ok(())
    }
}
