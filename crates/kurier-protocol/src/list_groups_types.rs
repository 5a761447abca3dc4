//! ListGroups API types (API key 16, version 0)

use kurier_common::Result;
use serde::{Deserialize, Serialize};

use crate::parser::{Decoder, Encoder};

/// ListGroups request (empty body)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListGroupsRequest;

impl ListGroupsRequest {
    pub fn encode(&self, _encoder: &mut Encoder, _version: i16) -> Result<()> {
        Ok(())
    }
}

/// ListGroups response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListGroupsResponse {
    pub error_code: i16,
    pub groups: Vec<ListedGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListedGroup {
    pub group_id: String,
    pub protocol_type: String,
}

impl ListGroupsResponse {
    pub fn decode(decoder: &mut Decoder, _version: i16) -> Result<Self> {
        let error_code = decoder.read_i16()?;
        let group_count = decoder.read_i32()?;
        let mut groups = Vec::with_capacity(group_count.max(0) as usize);
        for _ in 0..group_count {
            let group_id = decoder.read_string()?.unwrap_or_default();
            let protocol_type = decoder.read_string()?.unwrap_or_default();
            groups.push(ListedGroup { group_id, protocol_type });
        }
        Ok(ListGroupsResponse { error_code, groups })
    }

    pub fn encode(&self, encoder: &mut Encoder, _version: i16) -> Result<()> {
        encoder.write_i16(self.error_code);
        encoder.write_i32(self.groups.len() as i32);
        for group in &self.groups {
            encoder.write_string(Some(&group.group_id));
            encoder.write_string(Some(&group.protocol_type));
        }
        Ok(())
    }
}
