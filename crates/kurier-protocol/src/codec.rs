//! Request/response codec entry points.
//!
//! Requests and responses are closed sums, one variant per api key; the
//! codec is a pure function of the context and the payload and keeps no
//! state between calls. Responses are decoded against the api key recorded
//! with the matching request, never sniffed from the frame.

use bytes::{Bytes, BytesMut};
use kurier_common::{Error, Result};
use tracing::trace;

use crate::api_versions_types::{ApiVersionsRequest, ApiVersionsResponse};
use crate::context::RequestContext;
use crate::create_topics_types::{CreateTopicsRequest, CreateTopicsResponse};
use crate::delete_topics_types::{DeleteTopicsRequest, DeleteTopicsResponse};
use crate::describe_groups_types::{DescribeGroupsRequest, DescribeGroupsResponse};
use crate::fetch_types::{FetchRequest, FetchResponse};
use crate::find_coordinator_types::{FindCoordinatorRequest, FindCoordinatorResponse};
use crate::heartbeat_types::{HeartbeatRequest, HeartbeatResponse};
use crate::join_group_types::{JoinGroupRequest, JoinGroupResponse};
use crate::leave_group_types::{LeaveGroupRequest, LeaveGroupResponse};
use crate::list_groups_types::{ListGroupsRequest, ListGroupsResponse};
use crate::list_offsets_types::{ListOffsetsRequest, ListOffsetsResponse};
use crate::metadata_types::{MetadataRequest, MetadataResponse};
use crate::offset_commit_types::{OffsetCommitRequest, OffsetCommitResponse};
use crate::offset_fetch_types::{OffsetFetchRequest, OffsetFetchResponse};
use crate::parser::{supported_api_versions, ApiKey, Decoder, Encoder};
use crate::produce_types::{ProduceRequest, ProduceResponse};
use crate::sasl_types::{SaslHandshakeRequest, SaslHandshakeResponse};
use crate::sync_group_types::{SyncGroupRequest, SyncGroupResponse};

/// A request to any covered API.
#[derive(Debug, Clone)]
pub enum Request {
    Produce(ProduceRequest),
    Fetch(FetchRequest),
    ListOffsets(ListOffsetsRequest),
    Metadata(MetadataRequest),
    OffsetCommit(OffsetCommitRequest),
    OffsetFetch(OffsetFetchRequest),
    FindCoordinator(FindCoordinatorRequest),
    JoinGroup(JoinGroupRequest),
    Heartbeat(HeartbeatRequest),
    LeaveGroup(LeaveGroupRequest),
    SyncGroup(SyncGroupRequest),
    DescribeGroups(DescribeGroupsRequest),
    ListGroups(ListGroupsRequest),
    SaslHandshake(SaslHandshakeRequest),
    ApiVersions(ApiVersionsRequest),
    CreateTopics(CreateTopicsRequest),
    DeleteTopics(DeleteTopicsRequest),
}

/// A response from any covered API.
#[derive(Debug, Clone)]
pub enum Response {
    Produce(ProduceResponse),
    Fetch(FetchResponse),
    ListOffsets(ListOffsetsResponse),
    Metadata(MetadataResponse),
    OffsetCommit(OffsetCommitResponse),
    OffsetFetch(OffsetFetchResponse),
    FindCoordinator(FindCoordinatorResponse),
    JoinGroup(JoinGroupResponse),
    Heartbeat(HeartbeatResponse),
    LeaveGroup(LeaveGroupResponse),
    SyncGroup(SyncGroupResponse),
    DescribeGroups(DescribeGroupsResponse),
    ListGroups(ListGroupsResponse),
    SaslHandshake(SaslHandshakeResponse),
    ApiVersions(ApiVersionsResponse),
    CreateTopics(CreateTopicsResponse),
    DeleteTopics(DeleteTopicsResponse),
}

impl Request {
    /// The api key this request travels under.
    pub fn api_key(&self) -> ApiKey {
        match self {
            Request::Produce(_) => ApiKey::Produce,
            Request::Fetch(_) => ApiKey::Fetch,
            Request::ListOffsets(_) => ApiKey::ListOffsets,
            Request::Metadata(_) => ApiKey::Metadata,
            Request::OffsetCommit(_) => ApiKey::OffsetCommit,
            Request::OffsetFetch(_) => ApiKey::OffsetFetch,
            Request::FindCoordinator(_) => ApiKey::FindCoordinator,
            Request::JoinGroup(_) => ApiKey::JoinGroup,
            Request::Heartbeat(_) => ApiKey::Heartbeat,
            Request::LeaveGroup(_) => ApiKey::LeaveGroup,
            Request::SyncGroup(_) => ApiKey::SyncGroup,
            Request::DescribeGroups(_) => ApiKey::DescribeGroups,
            Request::ListGroups(_) => ApiKey::ListGroups,
            Request::SaslHandshake(_) => ApiKey::SaslHandshake,
            Request::ApiVersions(_) => ApiKey::ApiVersions,
            Request::CreateTopics(_) => ApiKey::CreateTopics,
            Request::DeleteTopics(_) => ApiKey::DeleteTopics,
        }
    }

    /// Whether the broker will send a response frame back.
    ///
    /// Only a Produce with acks=0 goes unanswered.
    pub fn expect_response(&self) -> bool {
        match self {
            Request::Produce(produce) => produce.expect_response(),
            _ => true,
        }
    }
}

fn check_version(api_key: ApiKey, version: i16) -> Result<()> {
    let versions = supported_api_versions();
    let range = versions
        .get(&api_key)
        .ok_or(Error::UnsupportedApiVersion { api_key: api_key as i16, version })?;
    if version < range.min || version > range.max {
        return Err(Error::UnsupportedApiVersion { api_key: api_key as i16, version });
    }
    Ok(())
}

/// Encode a request into a complete frame, length prefix included.
///
/// The header is `length:i32 || api_key:i16 || api_version:i16 ||
/// correlation_id:i32 || client_id:string`, followed by the body.
pub fn encode_request(ctx: &RequestContext, request: &Request) -> Result<Bytes> {
    let api_key = request.api_key();
    let version = ctx.api_version.unwrap_or(0);
    check_version(api_key, version)?;

    let mut buf = BytesMut::new();
    let mut encoder = Encoder::new(&mut buf);
    let frame = encoder.begin_size();
    encoder.write_i16(api_key as i16);
    encoder.write_i16(version);
    encoder.write_i32(ctx.correlation_id);
    encoder.write_string(ctx.client_id.as_deref());

    match request {
        Request::Produce(r) => r.encode(&mut encoder, version, ctx)?,
        Request::Fetch(r) => r.encode(&mut encoder, version)?,
        Request::ListOffsets(r) => r.encode(&mut encoder, version)?,
        Request::Metadata(r) => r.encode(&mut encoder, version)?,
        Request::OffsetCommit(r) => r.encode(&mut encoder, version)?,
        Request::OffsetFetch(r) => r.encode(&mut encoder, version)?,
        Request::FindCoordinator(r) => r.encode(&mut encoder, version)?,
        Request::JoinGroup(r) => r.encode(&mut encoder, version, ctx)?,
        Request::Heartbeat(r) => r.encode(&mut encoder, version)?,
        Request::LeaveGroup(r) => r.encode(&mut encoder, version)?,
        Request::SyncGroup(r) => r.encode(&mut encoder, version, ctx)?,
        Request::DescribeGroups(r) => r.encode(&mut encoder, version)?,
        Request::ListGroups(r) => r.encode(&mut encoder, version)?,
        Request::SaslHandshake(r) => r.encode(&mut encoder, version)?,
        Request::ApiVersions(r) => r.encode(&mut encoder, version)?,
        Request::CreateTopics(r) => r.encode(&mut encoder, version)?,
        Request::DeleteTopics(r) => r.encode(&mut encoder, version)?,
    }
    encoder.end_size(frame);

    trace!(
        api_key = api_key as i16,
        version,
        correlation_id = ctx.correlation_id,
        bytes = buf.len(),
        "encoded request"
    );
    Ok(buf.freeze())
}

/// Decode a response frame into the typed response for `api_key`.
///
/// `has_size` says whether the frame still carries its 4-byte length prefix
/// (true for raw captures) or the transport already consumed it (false for
/// frames handed over by the connection reader). The leading correlation id
/// is read and discarded either way; the multiplexer already matched it.
pub fn decode_response(
    ctx: &RequestContext,
    api_key: ApiKey,
    frame: Bytes,
    has_size: bool,
) -> Result<Response> {
    let version = ctx.api_version.unwrap_or(0);
    check_version(api_key, version)?;

    let mut decoder = Decoder::new(frame);
    if has_size {
        decoder.read_i32()?;
    }
    let correlation_id = decoder.read_i32()?;
    trace!(api_key = api_key as i16, version, correlation_id, "decoding response");

    let response = match api_key {
        ApiKey::Produce => Response::Produce(ProduceResponse::decode(&mut decoder, version)?),
        ApiKey::Fetch => Response::Fetch(FetchResponse::decode(&mut decoder, version)?),
        ApiKey::ListOffsets => {
            Response::ListOffsets(ListOffsetsResponse::decode(&mut decoder, version)?)
        }
        ApiKey::Metadata => Response::Metadata(MetadataResponse::decode(&mut decoder, version)?),
        ApiKey::OffsetCommit => {
            Response::OffsetCommit(OffsetCommitResponse::decode(&mut decoder, version)?)
        }
        ApiKey::OffsetFetch => {
            Response::OffsetFetch(OffsetFetchResponse::decode(&mut decoder, version)?)
        }
        ApiKey::FindCoordinator => {
            Response::FindCoordinator(FindCoordinatorResponse::decode(&mut decoder, version)?)
        }
        ApiKey::JoinGroup => {
            Response::JoinGroup(JoinGroupResponse::decode(&mut decoder, version, ctx)?)
        }
        ApiKey::Heartbeat => Response::Heartbeat(HeartbeatResponse::decode(&mut decoder, version)?),
        ApiKey::LeaveGroup => {
            Response::LeaveGroup(LeaveGroupResponse::decode(&mut decoder, version)?)
        }
        ApiKey::SyncGroup => {
            Response::SyncGroup(SyncGroupResponse::decode(&mut decoder, version, ctx)?)
        }
        ApiKey::DescribeGroups => {
            Response::DescribeGroups(DescribeGroupsResponse::decode(&mut decoder, version, ctx)?)
        }
        ApiKey::ListGroups => {
            Response::ListGroups(ListGroupsResponse::decode(&mut decoder, version)?)
        }
        ApiKey::SaslHandshake => {
            Response::SaslHandshake(SaslHandshakeResponse::decode(&mut decoder, version)?)
        }
        ApiKey::ApiVersions => {
            Response::ApiVersions(ApiVersionsResponse::decode(&mut decoder, version)?)
        }
        ApiKey::CreateTopics => {
            Response::CreateTopics(CreateTopicsResponse::decode(&mut decoder, version)?)
        }
        ApiKey::DeleteTopics => {
            Response::DeleteTopics(DeleteTopicsResponse::decode(&mut decoder, version)?)
        }
    };
    Ok(response)
}
