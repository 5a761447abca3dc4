//! OffsetFetch API types (API key 9, versions 0-1)

use kurier_common::Result;

use crate::parser::{Decoder, Encoder};
use crate::types::{group_by_first_occurrence, TopicPartition};

/// OffsetFetch request
#[derive(Debug, Clone)]
pub struct OffsetFetchRequest {
    pub group_id: String,
    /// Flat partition list; the encoder groups by topic
    pub partitions: Vec<TopicPartition>,
}

impl OffsetFetchRequest {
    pub fn encode(&self, encoder: &mut Encoder, _version: i16) -> Result<()> {
        encoder.write_string(Some(&self.group_id));

        let by_topic = group_by_first_occurrence(&self.partitions, |p| p.topic.clone());
        encoder.write_i32(by_topic.len() as i32);
        for (topic, partitions) in by_topic {
            encoder.write_string(Some(&topic));
            encoder.write_i32(partitions.len() as i32);
            for partition in partitions {
                encoder.write_i32(partition.partition);
            }
        }
        Ok(())
    }
}

/// OffsetFetch response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetFetchResponse {
    pub topics: Vec<OffsetFetchResponseTopic>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetFetchResponseTopic {
    pub name: String,
    pub partitions: Vec<OffsetFetchResponsePartition>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetFetchResponsePartition {
    pub partition: i32,
    /// Committed offset, -1 when the group has none
    pub offset: i64,
    pub metadata: Option<String>,
    pub error_code: i16,
}

impl OffsetFetchResponse {
    pub fn decode(decoder: &mut Decoder, _version: i16) -> Result<Self> {
        let topic_count = decoder.read_i32()?;
        let mut topics = Vec::with_capacity(topic_count.max(0) as usize);
        for _ in 0..topic_count {
            let name = decoder.read_string()?.unwrap_or_default();
            let partition_count = decoder.read_i32()?;
            let mut partitions = Vec::with_capacity(partition_count.max(0) as usize);
            for _ in 0..partition_count {
                let partition = decoder.read_i32()?;
                let offset = decoder.read_i64()?;
                let metadata = decoder.read_string()?;
                let error_code = decoder.read_i16()?;
                partitions.push(OffsetFetchResponsePartition {
                    partition,
                    offset,
                    metadata,
                    error_code,
                });
            }
            topics.push(OffsetFetchResponseTopic { name, partitions });
        }
        Ok(OffsetFetchResponse { topics })
    }

    pub fn encode(&self, encoder: &mut Encoder, _version: i16) -> Result<()> {
        encoder.write_i32(self.topics.len() as i32);
        for topic in &self.topics {
            encoder.write_string(Some(&topic.name));
            encoder.write_i32(topic.partitions.len() as i32);
            for partition in &topic.partitions {
                encoder.write_i32(partition.partition);
                encoder.write_i64(partition.offset);
                encoder.write_string(partition.metadata.as_deref());
                encoder.write_i16(partition.error_code);
            }
        }
        Ok(())
    }
}
