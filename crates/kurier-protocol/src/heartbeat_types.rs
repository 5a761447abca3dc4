//! Heartbeat API types (API key 12, version 0)

use kurier_common::Result;
use serde::{Deserialize, Serialize};

use crate::parser::{Decoder, Encoder};

/// Heartbeat request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatRequest {
    /// The group ID
    pub group_id: String,
    /// The generation ID
    pub generation_id: i32,
    /// The member ID
    pub member_id: String,
}

impl HeartbeatRequest {
    pub fn encode(&self, encoder: &mut Encoder, _version: i16) -> Result<()> {
        encoder.write_string(Some(&self.group_id));
        encoder.write_i32(self.generation_id);
        encoder.write_string(Some(&self.member_id));
        Ok(())
    }
}

/// Heartbeat response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartbeatResponse {
    /// Error code
    pub error_code: i16,
}

impl HeartbeatResponse {
    pub fn decode(decoder: &mut Decoder, _version: i16) -> Result<Self> {
        Ok(HeartbeatResponse { error_code: decoder.read_i16()? })
    }

    pub fn encode(&self, encoder: &mut Encoder, _version: i16) -> Result<()> {
        encoder.write_i16(self.error_code);
        Ok(())
    }
}

/// Error codes for Heartbeat
pub mod error_codes {
    pub const NONE: i16 = 0;
    pub const COORDINATOR_NOT_AVAILABLE: i16 = 15;
    pub const ILLEGAL_GENERATION: i16 = 22;
    pub const UNKNOWN_MEMBER_ID: i16 = 25;
    pub const REBALANCE_IN_PROGRESS: i16 = 27;
}
