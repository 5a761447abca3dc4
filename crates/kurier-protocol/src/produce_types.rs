//! Produce API types (API key 0, versions 0-2)

use kurier_common::Result;

use crate::compression::CompressionType;
use crate::context::RequestContext;
use crate::parser::{Decoder, Encoder};
use crate::records::{self, Message};
use crate::types::group_by_first_occurrence;

/// Produce request
#[derive(Debug, Clone)]
pub struct ProduceRequest {
    /// Required broker acknowledgements; 0 means fire-and-forget
    pub acks: i16,
    /// Broker-side timeout in milliseconds
    pub timeout_ms: i32,
    /// Flat payload list; the encoder groups by topic, partition and codec
    pub payloads: Vec<ProducePayload>,
}

/// Messages bound for one partition
#[derive(Debug, Clone)]
pub struct ProducePayload {
    pub topic: String,
    pub partition: i32,
    pub codec: CompressionType,
    pub messages: Vec<Message>,
}

impl ProduceRequest {
    /// Whether the broker will answer this request at all.
    pub fn expect_response(&self) -> bool {
        self.acks != 0
    }

    pub fn encode(&self, encoder: &mut Encoder, _version: i16, ctx: &RequestContext) -> Result<()> {
        encoder.write_i16(self.acks);
        encoder.write_i32(self.timeout_ms);

        let mut message_count = 0usize;
        let mut bytes_saved = 0i64;
        let payload_start = encoder.position();

        let by_topic = group_by_first_occurrence(&self.payloads, |p| p.topic.clone());
        encoder.write_i32(by_topic.len() as i32);
        for (topic, payloads) in by_topic {
            encoder.write_string(Some(&topic));

            let by_partition =
                group_by_first_occurrence(&payloads, |p| (p.partition, p.codec));
            encoder.write_i32(by_partition.len() as i32);
            for ((partition, codec), group) in by_partition {
                encoder.write_i32(partition);
                let messages: Vec<Message> = group
                    .iter()
                    .flat_map(|p| p.messages.iter().cloned())
                    .collect();
                message_count += messages.len();
                bytes_saved += records::write_message_set(encoder, &messages, codec)?;
            }
        }

        ctx.record_produce(message_count, encoder.position() - payload_start, bytes_saved);
        Ok(())
    }
}

/// Produce response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProduceResponse {
    pub topics: Vec<ProduceResponseTopic>,
    /// Throttle time in milliseconds (v1+)
    pub throttle_time_ms: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProduceResponseTopic {
    pub name: String,
    pub partitions: Vec<ProduceResponsePartition>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProduceResponsePartition {
    pub partition: i32,
    pub error_code: i16,
    pub base_offset: i64,
    /// Broker-assigned log append time (v2+)
    pub log_append_time: Option<i64>,
}

impl ProduceResponse {
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
                let base_offset = decoder.read_i64()?;
                let log_append_time = if version >= 2 {
                    Some(decoder.read_i64()?)
                } else {
                    None
                };
                partitions.push(ProduceResponsePartition {
                    partition,
                    error_code,
                    base_offset,
                    log_append_time,
                });
            }
            topics.push(ProduceResponseTopic { name, partitions });
        }

        let throttle_time_ms = if version >= 1 {
            Some(decoder.read_i32()?)
        } else {
            None
        };

        Ok(ProduceResponse { topics, throttle_time_ms })
    }

    pub fn encode(&self, encoder: &mut Encoder, version: i16) -> Result<()> {
        encoder.write_i32(self.topics.len() as i32);
        for topic in &self.topics {
            encoder.write_string(Some(&topic.name));
            encoder.write_i32(topic.partitions.len() as i32);
            for partition in &topic.partitions {
                encoder.write_i32(partition.partition);
                encoder.write_i16(partition.error_code);
                encoder.write_i64(partition.base_offset);
                if version >= 2 {
                    encoder.write_i64(partition.log_append_time.unwrap_or(-1));
                }
            }
        }
        if version >= 1 {
            encoder.write_i32(self.throttle_time_ms.unwrap_or(0));
        }
        Ok(())
    }
}
