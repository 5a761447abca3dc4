//! ListOffsets API types (API key 2, versions 0-1)

use kurier_common::Result;

use crate::parser::{Decoder, Encoder};
use crate::types::group_by_first_occurrence;

const CONSUMER_REPLICA_ID: i32 = -1;

/// Timestamp meaning "the next offset to be written"
pub const LATEST_TIMESTAMP: i64 = -1;
/// Timestamp meaning "the first available offset"
pub const EARLIEST_TIMESTAMP: i64 = -2;

/// ListOffsets request
#[derive(Debug, Clone)]
pub struct ListOffsetsRequest {
    /// Flat partition list; the encoder groups by topic
    pub offsets: Vec<PartitionOffsetRequest>,
}

#[derive(Debug, Clone)]
pub struct PartitionOffsetRequest {
    pub topic: String,
    pub partition: i32,
    /// Target timestamp, or one of the LATEST/EARLIEST sentinels
    pub timestamp: i64,
    /// Maximum number of offsets to return (v0 only)
    pub max_offsets: i32,
}

impl ListOffsetsRequest {
    pub fn encode(&self, encoder: &mut Encoder, version: i16) -> Result<()> {
        encoder.write_i32(CONSUMER_REPLICA_ID);

        let by_topic = group_by_first_occurrence(&self.offsets, |o| o.topic.clone());
        encoder.write_i32(by_topic.len() as i32);
        for (topic, offsets) in by_topic {
            encoder.write_string(Some(&topic));
            encoder.write_i32(offsets.len() as i32);
            for offset in offsets {
                encoder.write_i32(offset.partition);
                encoder.write_i64(offset.timestamp);
                if version == 0 {
                    encoder.write_i32(offset.max_offsets);
                }
            }
        }
        Ok(())
    }
}

/// ListOffsets response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOffsetsResponse {
    pub topics: Vec<ListOffsetsResponseTopic>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOffsetsResponseTopic {
    pub name: String,
    pub partitions: Vec<ListOffsetsResponsePartition>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOffsetsResponsePartition {
    pub partition: i32,
    pub error_code: i16,
    /// Timestamp of the found offset (v1)
    pub timestamp: Option<i64>,
    /// All matching offsets at v0; the single found offset at v1
    pub offsets: Vec<i64>,
}

impl ListOffsetsResponse {
    pub fn decode(decoder: &mut Decoder, version: i16) -> Result<Self> {
        let topic_count = decoder.read_i32()?;
        let mut topics = Vec::with_capacity(topic_count.max(0) as usize);
        for _ in 0..topic_count {
            let name = decoder.read_string()?.unwrap_or_default();

            let partition_count = decoder.read_i32()?;
            let mut partitions = Vec::with_capacity(partition_count.max(0) as usize);
            for _ in 0..partition_count {
                let partition = decoder.read_i32()?;
                let error_code = decoder.read_i16()?;
                let (timestamp, offsets) = if version >= 1 {
                    let timestamp = decoder.read_i64()?;
                    let offset = decoder.read_i64()?;
                    (Some(timestamp), vec![offset])
                } else {
                    let count = decoder.read_i32()?;
                    let mut offsets = Vec::with_capacity(count.max(0) as usize);
                    for _ in 0..count {
                        offsets.push(decoder.read_i64()?);
                    }
                    (None, offsets)
                };
                partitions.push(ListOffsetsResponsePartition {
                    partition,
                    error_code,
                    timestamp,
                    offsets,
                });
            }
            topics.push(ListOffsetsResponseTopic { name, partitions });
        }
        Ok(ListOffsetsResponse { topics })
    }

    pub fn encode(&self, encoder: &mut Encoder, version: i16) -> Result<()> {
        encoder.write_i32(self.topics.len() as i32);
        for topic in &self.topics {
            encoder.write_string(Some(&topic.name));
            encoder.write_i32(topic.partitions.len() as i32);
            for partition in &topic.partitions {
                encoder.write_i32(partition.partition);
                encoder.write_i16(partition.error_code);
                if version >= 1 {
                    encoder.write_i64(partition.timestamp.unwrap_or(-1));
                    encoder.write_i64(partition.offsets.first().copied().unwrap_or(-1));
                } else {
                    encoder.write_i32(partition.offsets.len() as i32);
                    for offset in &partition.offsets {
                        encoder.write_i64(*offset);
                    }
                }
            }
        }
        Ok(())
    }
}
