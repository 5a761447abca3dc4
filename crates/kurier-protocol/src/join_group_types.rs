//! JoinGroup API types (API key 11, versions 0-1)
//!
//! The per-protocol metadata blobs are opaque to this codec; encoding and
//! decoding is delegated to the membership encoder the context selects.

use kurier_common::Result;

use crate::context::RequestContext;
use crate::membership::{read_metadata_blob, write_metadata_blob, MemberMetadata};
use crate::parser::{Decoder, Encoder};

/// JoinGroup request
#[derive(Debug, Clone)]
pub struct JoinGroupRequest {
    pub group_id: String,
    pub session_timeout_ms: i32,
    /// How long the coordinator waits for members to rejoin (v1+)
    pub rebalance_timeout_ms: i32,
    /// Empty on first join; the coordinator assigns one
    pub member_id: String,
    pub protocol_type: String,
    pub protocols: Vec<GroupProtocol>,
}

/// One candidate protocol with its subscription metadata
#[derive(Debug, Clone)]
pub struct GroupProtocol {
    pub name: String,
    pub metadata: MemberMetadata,
}

impl JoinGroupRequest {
    pub fn encode(&self, encoder: &mut Encoder, version: i16, ctx: &RequestContext) -> Result<()> {
        encoder.write_string(Some(&self.group_id));
        encoder.write_i32(self.session_timeout_ms);
        if version >= 1 {
            encoder.write_i32(self.rebalance_timeout_ms);
        }
        encoder.write_string(Some(&self.member_id));
        encoder.write_string(Some(&self.protocol_type));

        encoder.write_i32(self.protocols.len() as i32);
        for protocol in &self.protocols {
            encoder.write_string(Some(&protocol.name));
            write_metadata_blob(encoder, ctx, Some(&self.protocol_type), &protocol.metadata)?;
        }
        Ok(())
    }
}

/// JoinGroup response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinGroupResponse {
    pub error_code: i16,
    pub generation_id: i32,
    /// The protocol the coordinator settled on
    pub group_protocol: String,
    pub leader_id: String,
    pub member_id: String,
    /// Present only for the elected leader
    pub members: Vec<JoinGroupMember>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinGroupMember {
    pub member_id: String,
    pub metadata: MemberMetadata,
}

impl JoinGroupResponse {
    pub fn decode(decoder: &mut Decoder, _version: i16, ctx: &RequestContext) -> Result<Self> {
        let error_code = decoder.read_i16()?;
        let generation_id = decoder.read_i32()?;
        let group_protocol = decoder.read_string()?.unwrap_or_default();
        let leader_id = decoder.read_string()?.unwrap_or_default();
        let member_id = decoder.read_string()?.unwrap_or_default();

        let member_count = decoder.read_i32()?;
        let mut members = Vec::with_capacity(member_count.max(0) as usize);
        for _ in 0..member_count {
            let member_id = decoder.read_string()?.unwrap_or_default();
            let metadata = read_metadata_blob(decoder, ctx, None, &group_protocol)?;
            members.push(JoinGroupMember { member_id, metadata });
        }

        Ok(JoinGroupResponse {
            error_code,
            generation_id,
            group_protocol,
            leader_id,
            member_id,
            members,
        })
    }

    pub fn encode(&self, encoder: &mut Encoder, _version: i16, ctx: &RequestContext) -> Result<()> {
        encoder.write_i16(self.error_code);
        encoder.write_i32(self.generation_id);
        encoder.write_string(Some(&self.group_protocol));
        encoder.write_string(Some(&self.leader_id));
        encoder.write_string(Some(&self.member_id));
        encoder.write_i32(self.members.len() as i32);
        for member in &self.members {
            encoder.write_string(Some(&member.member_id));
            write_metadata_blob(encoder, ctx, None, &member.metadata)?;
        }
        Ok(())
    }
}

/// Error codes for JoinGroup
pub mod error_codes {
    pub const NONE: i16 = 0;
    pub const COORDINATOR_NOT_AVAILABLE: i16 = 15;
    pub const INCONSISTENT_GROUP_PROTOCOL: i16 = 23;
    pub const UNKNOWN_MEMBER_ID: i16 = 25;
    pub const INVALID_SESSION_TIMEOUT: i16 = 26;
    pub const REBALANCE_IN_PROGRESS: i16 = 27;
}
