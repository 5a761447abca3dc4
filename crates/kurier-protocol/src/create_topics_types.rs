//! CreateTopics API types (API key 19, versions 0-1)

use kurier_common::Result;
use serde::{Deserialize, Serialize};

use crate::parser::{Decoder, Encoder};

/// CreateTopics request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTopicsRequest {
    pub topics: Vec<CreatableTopic>,
    /// How long the broker may block before answering, in milliseconds
    pub timeout_ms: i32,
    /// Validate without creating (v1+)
    pub validate_only: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatableTopic {
    pub name: String,
    /// -1 when replica assignments are given explicitly
    pub num_partitions: i32,
    /// -1 when replica assignments are given explicitly
    pub replication_factor: i16,
    pub replica_assignments: Vec<ReplicaAssignment>,
    pub configs: Vec<TopicConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicaAssignment {
    pub partition: i32,
    pub replicas: Vec<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicConfig {
    pub name: String,
    pub value: Option<String>,
}

impl CreateTopicsRequest {
    pub fn encode(&self, encoder: &mut Encoder, version: i16) -> Result<()> {
        encoder.write_i32(self.topics.len() as i32);
        for topic in &self.topics {
            encoder.write_string(Some(&topic.name));
            encoder.write_i32(topic.num_partitions);
            encoder.write_i16(topic.replication_factor);

            encoder.write_i32(topic.replica_assignments.len() as i32);
            for assignment in &topic.replica_assignments {
                encoder.write_i32(assignment.partition);
                encoder.write_i32_array(&assignment.replicas);
            }

            encoder.write_i32(topic.configs.len() as i32);
            for config in &topic.configs {
                encoder.write_string(Some(&config.name));
                encoder.write_string(config.value.as_deref());
            }
        }
        encoder.write_i32(self.timeout_ms);
        if version >= 1 {
            encoder.write_bool(self.validate_only);
        }
        Ok(())
    }
}

/// CreateTopics response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTopicsResponse {
    pub topics: Vec<CreatableTopicResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatableTopicResult {
    pub name: String,
    pub error_code: i16,
    /// Human-readable failure detail (v1+)
    pub error_message: Option<String>,
}

impl CreateTopicsResponse {
    pub fn decode(decoder: &mut Decoder, version: i16) -> Result<Self> {
        let count = decoder.read_i32()?;
        let mut topics = Vec::with_capacity(count.max(0) as usize);
        for _ in 0..count {
            let name = decoder.read_string()?.unwrap_or_default();
            let error_code = decoder.read_i16()?;
            let error_message = if version >= 1 { decoder.read_string()? } else { None };
            topics.push(CreatableTopicResult { name, error_code, error_message });
        }
        Ok(CreateTopicsResponse { topics })
    }

    pub fn encode(&self, encoder: &mut Encoder, version: i16) -> Result<()> {
        encoder.write_i32(self.topics.len() as i32);
        for topic in &self.topics {
            encoder.write_string(Some(&topic.name));
            encoder.write_i16(topic.error_code);
            if version >= 1 {
                encoder.write_string(topic.error_message.as_deref());
            }
        }
        Ok(())
    }
}

/// Error codes for CreateTopics
pub mod error_codes {
    pub const NONE: i16 = 0;
    pub const TOPIC_ALREADY_EXISTS: i16 = 36;
    pub const INVALID_PARTITIONS: i16 = 37;
    pub const INVALID_REPLICATION_FACTOR: i16 = 38;
}
