//! DescribeGroups API types (API key 15, version 0)

use kurier_common::Result;

use crate::context::RequestContext;
use crate::membership::{
    read_assignment_blob, read_metadata_blob, MemberAssignment, MemberMetadata,
};
use crate::parser::{Decoder, Encoder};

/// DescribeGroups request
#[derive(Debug, Clone)]
pub struct DescribeGroupsRequest {
    pub group_ids: Vec<String>,
}

impl DescribeGroupsRequest {
    pub fn encode(&self, encoder: &mut Encoder, _version: i16) -> Result<()> {
        encoder.write_string_array(&self.group_ids);
        Ok(())
    }
}

/// DescribeGroups response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribeGroupsResponse {
    pub groups: Vec<DescribedGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribedGroup {
    pub error_code: i16,
    pub group_id: String,
    pub state: String,
    pub protocol_type: String,
    /// Selected protocol, empty while the group is rebalancing
    pub protocol: String,
    pub members: Vec<DescribedGroupMember>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribedGroupMember {
    pub member_id: String,
    pub client_id: String,
    pub client_host: String,
    pub metadata: MemberMetadata,
    pub assignment: MemberAssignment,
}

impl DescribeGroupsResponse {
    pub fn decode(decoder: &mut Decoder, _version: i16, ctx: &RequestContext) -> Result<Self> {
        let group_count = decoder.read_i32()?;
        let mut groups = Vec::with_capacity(group_count.max(0) as usize);
        for _ in 0..group_count {
            let error_code = decoder.read_i16()?;
            let group_id = decoder.read_string()?.unwrap_or_default();
            let state = decoder.read_string()?.unwrap_or_default();
            let protocol_type = decoder.read_string()?.unwrap_or_default();
            let protocol = decoder.read_string()?.unwrap_or_default();

            let member_count = decoder.read_i32()?;
            let mut members = Vec::with_capacity(member_count.max(0) as usize);
            for _ in 0..member_count {
                let member_id = decoder.read_string()?.unwrap_or_default();
                let client_id = decoder.read_string()?.unwrap_or_default();
                let client_host = decoder.read_string()?.unwrap_or_default();
                // each group names its own protocol type; prefer it over the
                // context's when selecting the blob codec
                let metadata =
                    read_metadata_blob(decoder, ctx, Some(&protocol_type), &protocol)?;
                let assignment = read_assignment_blob(decoder, ctx, Some(&protocol_type))?;
                members.push(DescribedGroupMember {
                    member_id,
                    client_id,
                    client_host,
                    metadata,
                    assignment,
                });
            }

            groups.push(DescribedGroup {
                error_code,
                group_id,
                state,
                protocol_type,
                protocol,
                members,
            });
        }
        Ok(DescribeGroupsResponse { groups })
    }
}
