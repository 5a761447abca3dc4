//! Kafka wire protocol implementation for the kurier client.
//!
//! This crate provides the pure codec half of the client:
//! - Big-endian primitives with scoped size and CRC markers
//! - Legacy message container format (magic 0 and 1) with gzip sets
//! - Versioned request/response encoding for the covered APIs
//! - The request context and pluggable membership encoders
//! - Request/response framing with length prefixes
//!
//! Everything here is purely computational; the connection half lives in
//! `kurier-client`.

pub mod api_versions_types;
pub mod codec;
pub mod compression;
pub mod context;
pub mod create_topics_types;
pub mod delete_topics_types;
pub mod describe_groups_types;
pub mod error_codes;
pub mod fetch_types;
pub mod find_coordinator_types;
pub mod frame;
pub mod heartbeat_types;
pub mod join_group_types;
pub mod leave_group_types;
pub mod list_groups_types;
pub mod list_offsets_types;
pub mod membership;
pub mod metadata_types;
pub mod offset_commit_types;
pub mod offset_fetch_types;
pub mod parser;
pub mod produce_types;
pub mod records;
pub mod sasl_types;
pub mod sync_group_types;
pub mod types;

// Re-export main types
pub use codec::{decode_response, encode_request, Request, Response};
pub use compression::CompressionType;
pub use context::RequestContext;
pub use frame::FrameCodec;
pub use membership::{
    ConsumerEncoder, ConsumerMemberAssignment, ConsumerMemberMetadata, MemberAssignment,
    MemberMetadata, MembershipEncoder,
};
pub use parser::{supported_api_versions, ApiKey, Decoder, Encoder, VersionRange};
pub use records::{Message, MESSAGE_HEADER_SIZE};
pub use types::TopicPartition;
