//! OffsetCommit API types (API key 8, versions 0-2)

use kurier_common::Result;

use crate::parser::{Decoder, Encoder};
use crate::types::group_by_first_occurrence;

/// Retention sentinel asking the broker for its configured default.
pub const DEFAULT_RETENTION: i64 = -1;

/// OffsetCommit request
#[derive(Debug, Clone)]
pub struct OffsetCommitRequest {
    pub group_id: String,
    /// Group generation (v1+)
    pub generation_id: i32,
    /// Member id within the group (v1+)
    pub member_id: String,
    /// Offset retention in milliseconds, -1 for the broker default (v2+)
    pub retention_time_ms: i64,
    /// Flat commit list; the encoder groups by topic
    pub commits: Vec<OffsetCommit>,
}

#[derive(Debug, Clone)]
pub struct OffsetCommit {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    /// Commit timestamp (v1 only)
    pub timestamp: i64,
    pub metadata: Option<String>,
}

impl OffsetCommitRequest {
    pub fn encode(&self, encoder: &mut Encoder, version: i16) -> Result<()> {
        encoder.write_string(Some(&self.group_id));
        if version >= 1 {
            encoder.write_i32(self.generation_id);
            encoder.write_string(Some(&self.member_id));
        }
        if version >= 2 {
            encoder.write_i64(self.retention_time_ms);
        }

        let by_topic = group_by_first_occurrence(&self.commits, |c| c.topic.clone());
        encoder.write_i32(by_topic.len() as i32);
        for (topic, commits) in by_topic {
            encoder.write_string(Some(&topic));
            encoder.write_i32(commits.len() as i32);
            for commit in commits {
                encoder.write_i32(commit.partition);
                encoder.write_i64(commit.offset);
                if version == 1 {
                    encoder.write_i64(commit.timestamp);
                }
                encoder.write_string(commit.metadata.as_deref());
            }
        }
        Ok(())
    }
}

/// OffsetCommit response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetCommitResponse {
    pub topics: Vec<OffsetCommitResponseTopic>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetCommitResponseTopic {
    pub name: String,
    pub partitions: Vec<OffsetCommitResponsePartition>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetCommitResponsePartition {
    pub partition: i32,
    pub error_code: i16,
}

impl OffsetCommitResponse {
    pub fn decode(decoder: &mut Decoder, _version: i16) -> Result<Self> {
        let topic_count = decoder.read_i32()?;
        let mut topics = Vec::with_capacity(topic_count.max(0) as usize);
        for _ in 0..topic_count {
            let name = decoder.read_string()?.unwrap_or_default();
            let partition_count = decoder.read_i32()?;
            let mut partitions = Vec::with_capacity(partition_count.max(0) as usize);
            for _ in 0..partition_count {
                let partition = decoder.read_i32()?;
                let error_code = decoder.read_i16()?;
                partitions.push(OffsetCommitResponsePartition { partition, error_code });
            }
            topics.push(OffsetCommitResponseTopic { name, partitions });
        }
        Ok(OffsetCommitResponse { topics })
    }

    pub fn encode(&self, encoder: &mut Encoder, _version: i16) -> Result<()> {
        encoder.write_i32(self.topics.len() as i32);
        for topic in &self.topics {
            encoder.write_string(Some(&topic.name));
            encoder.write_i32(topic.partitions.len() as i32);
            for partition in &topic.partitions {
                encoder.write_i32(partition.partition);
                encoder.write_i16(partition.error_code);
            }
        }
        Ok(())
    }
}
