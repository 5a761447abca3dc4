//! SyncGroup API types (API key 14, version 0)

use kurier_common::Result;

use crate::context::RequestContext;
use crate::membership::{read_assignment_blob, write_assignment_blob, MemberAssignment};
use crate::parser::{Decoder, Encoder};

/// SyncGroup request
#[derive(Debug, Clone)]
pub struct SyncGroupRequest {
    pub group_id: String,
    pub generation_id: i32,
    pub member_id: String,
    /// Leader-computed assignments; empty for followers
    pub assignments: Vec<GroupAssignment>,
}

#[derive(Debug, Clone)]
pub struct GroupAssignment {
    pub member_id: String,
    pub assignment: MemberAssignment,
}

impl SyncGroupRequest {
    pub fn encode(&self, encoder: &mut Encoder, _version: i16, ctx: &RequestContext) -> Result<()> {
        encoder.write_string(Some(&self.group_id));
        encoder.write_i32(self.generation_id);
        encoder.write_string(Some(&self.member_id));
        encoder.write_i32(self.assignments.len() as i32);
        for assignment in &self.assignments {
            encoder.write_string(Some(&assignment.member_id));
            write_assignment_blob(encoder, ctx, None, &assignment.assignment)?;
        }
        Ok(())
    }
}

/// SyncGroup response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncGroupResponse {
    pub error_code: i16,
    /// This member's assignment as chosen by the leader
    pub assignment: MemberAssignment,
}

impl SyncGroupResponse {
    pub fn decode(decoder: &mut Decoder, _version: i16, ctx: &RequestContext) -> Result<Self> {
        let error_code = decoder.read_i16()?;
        let assignment = read_assignment_blob(decoder, ctx, None)?;
        Ok(SyncGroupResponse { error_code, assignment })
    }

    pub fn encode(&self, encoder: &mut Encoder, _version: i16, ctx: &RequestContext) -> Result<()> {
        encoder.write_i16(self.error_code);
        write_assignment_blob(encoder, ctx, None, &self.assignment)?;
        Ok(())
    }
}
