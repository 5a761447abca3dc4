//! LeaveGroup API types (API key 13, version 0)

use kurier_common::Result;
use serde::{Deserialize, Serialize};

use crate::parser::{Decoder, Encoder};

/// LeaveGroup request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveGroupRequest {
    pub group_id: String,
    pub member_id: String,
}

impl LeaveGroupRequest {
    pub fn encode(&self, encoder: &mut Encoder, _version: i16) -> Result<()> {
        encoder.write_string(Some(&self.group_id));
        encoder.write_string(Some(&self.member_id));
        Ok(())
    }
}

/// LeaveGroup response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveGroupResponse {
    pub error_code: i16,
}

impl LeaveGroupResponse {
    pub fn decode(decoder: &mut Decoder, _version: i16) -> Result<Self> {
        Ok(LeaveGroupResponse { error_code: decoder.read_i16()? })
    }

    pub fn encode(&self, encoder: &mut Encoder, _version: i16) -> Result<()> {
        encoder.write_i16(self.error_code);
        Ok(())
    }
}
