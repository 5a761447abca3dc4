//! DeleteTopics API types (API key 20, version 0)

use kurier_common::Result;
use serde::{Deserialize, Serialize};

use crate::parser::{Decoder, Encoder};

/// DeleteTopics request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteTopicsRequest {
    pub topics: Vec<String>,
    pub timeout_ms: i32,
}

impl DeleteTopicsRequest {
    pub fn encode(&self, encoder: &mut Encoder, _version: i16) -> Result<()> {
        encoder.write_string_array(&self.topics);
        encoder.write_i32(self.timeout_ms);
        Ok(())
    }
}

/// DeleteTopics response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteTopicsResponse {
    pub topics: Vec<DeletableTopicResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletableTopicResult {
    pub name: String,
    pub error_code: i16,
}

impl DeleteTopicsResponse {
    pub fn decode(decoder: &mut Decoder, _version: i16) -> Result<Self> {
        let count = decoder.read_i32()?;
        let mut topics = Vec::with_capacity(count.max(0) as usize);
        for _ in 0..count {
            let name = decoder.read_string()?.unwrap_or_default();
            let error_code = decoder.read_i16()?;
            topics.push(DeletableTopicResult { name, error_code });
        }
        Ok(DeleteTopicsResponse { topics })
    }

    pub fn encode(&self, encoder: &mut Encoder, _version: i16) -> Result<()> {
        encoder.write_i32(self.topics.len() as i32);
        for topic in &self.topics {
            encoder.write_string(Some(&topic.name));
            encoder.write_i16(topic.error_code);
        }
        Ok(())
    }
}
