//! Pluggable codecs for the opaque member metadata and assignment blobs
//! inside the group APIs.
//!
//! JoinGroup, SyncGroup and DescribeGroups carry per-protocol-type payloads
//! the broker never interprets. The context maps a protocol type (e.g.
//! `"consumer"`) to a [`MembershipEncoder`]; blobs with no registered
//! encoder round-trip untouched as raw bytes.

use bytes::Bytes;
use kurier_common::{Error, Result};
use std::fmt;

use crate::parser::{Decoder, Encoder};

/// Partitions of one topic inside a consumer assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicPartitions {
    pub topic: String,
    pub partitions: Vec<i32>,
}

/// Member metadata carried in JoinGroup protocols and DescribeGroups members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberMetadata {
    /// Unparsed blob for protocol types with no registered encoder
    Raw(Bytes),
    Consumer(ConsumerMemberMetadata),
}

/// Member assignment carried in SyncGroup and DescribeGroups members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberAssignment {
    /// Unparsed blob for protocol types with no registered encoder
    Raw(Bytes),
    Consumer(ConsumerMemberAssignment),
}

/// Subscription metadata of the standard `"consumer"` protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerMemberMetadata {
    pub version: i16,
    /// Assignment strategy this metadata was published under
    pub strategy: String,
    pub topics: Vec<String>,
    pub user_data: Option<Bytes>,
}

/// Partition assignment of the standard `"consumer"` protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerMemberAssignment {
    pub version: i16,
    pub assignments: Vec<TopicPartitions>,
    pub user_data: Option<Bytes>,
}

/// Codec for one protocol type's metadata and assignment blobs.
///
/// The surrounding bytes-field framing belongs to the request codec; an
/// implementation reads and writes only the blob content.
pub trait MembershipEncoder: fmt::Debug + Send + Sync {
    fn encode_metadata(&self, encoder: &mut Encoder, metadata: &MemberMetadata) -> Result<()>;
    fn decode_metadata(&self, protocol_name: &str, decoder: &mut Decoder) -> Result<MemberMetadata>;
    fn encode_assignment(&self, encoder: &mut Encoder, assignment: &MemberAssignment) -> Result<()>;
    fn decode_assignment(&self, decoder: &mut Decoder) -> Result<MemberAssignment>;
}

/// Write a metadata blob inside its bytes-field framing.
///
/// Raw blobs pass through unchanged; typed blobs require an encoder for the
/// protocol type.
pub(crate) fn write_metadata_blob(
    encoder: &mut Encoder,
    ctx: &crate::context::RequestContext,
    protocol_type: Option<&str>,
    metadata: &MemberMetadata,
) -> Result<()> {
    match metadata {
        MemberMetadata::Raw(bytes) => {
            encoder.write_bytes(Some(bytes));
            Ok(())
        }
        typed => {
            let codec = ctx.encoder_for(protocol_type).ok_or_else(|| {
                Error::Protocol("no membership encoder registered for typed metadata".into())
            })?;
            let size = encoder.begin_size();
            codec.encode_metadata(encoder, typed)?;
            encoder.end_size(size);
            Ok(())
        }
    }
}

/// Read a metadata blob out of its bytes-field framing.
pub(crate) fn read_metadata_blob(
    decoder: &mut Decoder,
    ctx: &crate::context::RequestContext,
    protocol_type: Option<&str>,
    protocol_name: &str,
) -> Result<MemberMetadata> {
    let blob = decoder.read_bytes()?.unwrap_or_default();
    match ctx.encoder_for(protocol_type) {
        Some(codec) if !blob.is_empty() => {
            codec.decode_metadata(protocol_name, &mut Decoder::new(blob))
        }
        _ => Ok(MemberMetadata::Raw(blob)),
    }
}

/// Write an assignment blob inside its bytes-field framing.
pub(crate) fn write_assignment_blob(
    encoder: &mut Encoder,
    ctx: &crate::context::RequestContext,
    protocol_type: Option<&str>,
    assignment: &MemberAssignment,
) -> Result<()> {
    match assignment {
        MemberAssignment::Raw(bytes) => {
            encoder.write_bytes(Some(bytes));
            Ok(())
        }
        typed => {
            let codec = ctx.encoder_for(protocol_type).ok_or_else(|| {
                Error::Protocol("no membership encoder registered for typed assignment".into())
            })?;
            let size = encoder.begin_size();
            codec.encode_assignment(encoder, typed)?;
            encoder.end_size(size);
            Ok(())
        }
    }
}

/// Read an assignment blob out of its bytes-field framing.
pub(crate) fn read_assignment_blob(
    decoder: &mut Decoder,
    ctx: &crate::context::RequestContext,
    protocol_type: Option<&str>,
) -> Result<MemberAssignment> {
    let blob = decoder.read_bytes()?.unwrap_or_default();
    match ctx.encoder_for(protocol_type) {
        Some(codec) if !blob.is_empty() => codec.decode_assignment(&mut Decoder::new(blob)),
        _ => Ok(MemberAssignment::Raw(blob)),
    }
}

/// Encoder for the standard `"consumer"` coordination protocol.
#[derive(Debug, Default)]
pub struct ConsumerEncoder;

impl MembershipEncoder for ConsumerEncoder {
    fn encode_metadata(&self, encoder: &mut Encoder, metadata: &MemberMetadata) -> Result<()> {
        match metadata {
            MemberMetadata::Raw(bytes) => {
                encoder.write_raw_bytes(bytes);
                Ok(())
            }
            MemberMetadata::Consumer(meta) => {
                encoder.write_i16(meta.version);
                encoder.write_string_array(&meta.topics);
                encoder.write_bytes(meta.user_data.as_deref());
                Ok(())
            }
        }
    }

    fn decode_metadata(&self, protocol_name: &str, decoder: &mut Decoder) -> Result<MemberMetadata> {
        let version = decoder.read_i16()?;
        let count = decoder.read_i32()?;
        let mut topics = Vec::with_capacity(count.max(0) as usize);
        for _ in 0..count {
            topics.push(
                decoder
                    .read_string()?
                    .ok_or_else(|| Error::Protocol("null topic in member metadata".into()))?,
            );
        }
        let user_data = decoder.read_bytes()?;

        Ok(MemberMetadata::Consumer(ConsumerMemberMetadata {
            version,
            strategy: protocol_name.to_string(),
            topics,
            user_data,
        }))
    }

    fn encode_assignment(&self, encoder: &mut Encoder, assignment: &MemberAssignment) -> Result<()> {
        match assignment {
            MemberAssignment::Raw(bytes) => {
                encoder.write_raw_bytes(bytes);
                Ok(())
            }
            MemberAssignment::Consumer(assignment) => {
                encoder.write_i16(assignment.version);
                encoder.write_i32(assignment.assignments.len() as i32);
                for topic in &assignment.assignments {
                    encoder.write_string(Some(&topic.topic));
                    encoder.write_i32_array(&topic.partitions);
                }
                encoder.write_bytes(assignment.user_data.as_deref());
                Ok(())
            }
        }
    }

    fn decode_assignment(&self, decoder: &mut Decoder) -> Result<MemberAssignment> {
        let version = decoder.read_i16()?;
        let count = decoder.read_i32()?;
        let mut assignments = Vec::with_capacity(count.max(0) as usize);
        for _ in 0..count {
            let topic = decoder
                .read_string()?
                .ok_or_else(|| Error::Protocol("null topic in member assignment".into()))?;
            let partitions = decoder.read_i32_array()?;
            assignments.push(TopicPartitions { topic, partitions });
        }
        let user_data = decoder.read_bytes()?;

        Ok(MemberAssignment::Consumer(ConsumerMemberAssignment {
            version,
            assignments,
            user_data,
        }))
    }
}
