//! Fetch API types (API key 1, versions 0-3)

use kurier_common::Result;

use crate::parser::{Decoder, Encoder};
use crate::records::{self, Message};
use crate::types::group_by_first_occurrence;

/// Replica id a plain consumer sends.
const CONSUMER_REPLICA_ID: i32 = -1;

/// Fetch request
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// How long the broker may block waiting for min_bytes, in milliseconds
    pub max_wait_ms: i32,
    /// Minimum bytes to accumulate before responding
    pub min_bytes: i32,
    /// Response size cap across all partitions (v3+)
    pub max_bytes: i32,
    /// Flat fetch list; the encoder groups by topic
    pub fetches: Vec<PartitionFetch>,
}

/// One partition's fetch position
#[derive(Debug, Clone)]
pub struct PartitionFetch {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    /// Per-partition response size cap
    pub max_bytes: i32,
}

impl FetchRequest {
    pub fn encode(&self, encoder: &mut Encoder, version: i16) -> Result<()> {
        encoder.write_i32(CONSUMER_REPLICA_ID);
        encoder.write_i32(self.max_wait_ms);
        encoder.write_i32(self.min_bytes);
        if version >= 3 {
            encoder.write_i32(self.max_bytes);
        }

        let by_topic = group_by_first_occurrence(&self.fetches, |f| f.topic.clone());
        encoder.write_i32(by_topic.len() as i32);
        for (topic, fetches) in by_topic {
            encoder.write_string(Some(&topic));
            encoder.write_i32(fetches.len() as i32);
            for fetch in fetches {
                encoder.write_i32(fetch.partition);
                encoder.write_i64(fetch.offset);
                encoder.write_i32(fetch.max_bytes);
            }
        }
        Ok(())
    }
}

/// Fetch response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// Throttle time in milliseconds (v1+)
    pub throttle_time_ms: Option<i32>,
    pub topics: Vec<FetchResponseTopic>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponseTopic {
    pub name: String,
    pub partitions: Vec<FetchResponsePartition>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponsePartition {
    pub partition: i32,
    pub error_code: i16,
    pub high_watermark: i64,
    pub messages: Vec<Message>,
}

impl FetchResponse {
    pub fn decode(decoder: &mut Decoder, version: i16) -> Result<Self> {
        let throttle_time_ms = if version >= 1 {
            Some(decoder.read_i32()?)
        } else {
            None
        };

        let topic_count = decoder.read_i32()?;
        let mut topics = Vec::with_capacity(topic_count.max(0) as usize);
        for _ in 0..topic_count {
            let name = decoder.read_string()?.unwrap_or_default();

            let partition_count = decoder.read_i32()?;
            let mut partitions = Vec::with_capacity(partition_count.max(0) as usize);
            for _ in 0..partition_count {
                let partition = decoder.read_i32()?;
                let error_code = decoder.read_i16()?;
                let high_watermark = decoder.read_i64()?;
                let messages = records::read_message_set(decoder)?;
                partitions.push(FetchResponsePartition {
                    partition,
                    error_code,
                    high_watermark,
                    messages,
                });
            }
            topics.push(FetchResponseTopic { name, partitions });
        }

        Ok(FetchResponse { throttle_time_ms, topics })
    }

    pub fn encode(&self, encoder: &mut Encoder, version: i16) -> Result<()> {
        if version >= 1 {
            encoder.write_i32(self.throttle_time_ms.unwrap_or(0));
        }
        encoder.write_i32(self.topics.len() as i32);
        for topic in &self.topics {
            encoder.write_string(Some(&topic.name));
            encoder.write_i32(topic.partitions.len() as i32);
            for partition in &topic.partitions {
                encoder.write_i32(partition.partition);
                encoder.write_i16(partition.error_code);
                encoder.write_i64(partition.high_watermark);
                let size = encoder.begin_size();
                records::write_message_set_entries(encoder, &partition.messages);
                encoder.end_size(size);
            }
        }
        Ok(())
    }
}
