//! Metadata API types (API key 3, versions 0-2)

use kurier_common::Result;
use serde::{Deserialize, Serialize};

use crate::parser::{Decoder, Encoder};

/// Metadata request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataRequest {
    /// Topics to describe; `None` asks for all topics
    pub topics: Option<Vec<String>>,
}

impl MetadataRequest {
    /// Request metadata for every topic in the cluster.
    pub fn all_topics() -> Self {
        Self { topics: None }
    }

    pub fn encode(&self, encoder: &mut Encoder, _version: i16) -> Result<()> {
        match &self.topics {
            Some(topics) => encoder.write_string_array(topics),
            None => encoder.write_i32(-1),
        }
        Ok(())
    }
}

/// Metadata response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataResponse {
    pub brokers: Vec<MetadataBroker>,
    /// Cluster id (v2+)
    pub cluster_id: Option<String>,
    /// Controller broker id (v1+)
    pub controller_id: Option<i32>,
    pub topics: Vec<MetadataTopic>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataBroker {
    pub node_id: i32,
    pub host: String,
    pub port: i32,
    /// Rack label (v1+)
    pub rack: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataTopic {
    pub error_code: i16,
    pub name: String,
    /// Whether the topic is broker-internal (v1+)
    pub is_internal: bool,
    pub partitions: Vec<MetadataPartition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataPartition {
    pub error_code: i16,
    pub partition: i32,
    pub leader: i32,
    pub replicas: Vec<i32>,
    pub isr: Vec<i32>,
}

impl MetadataResponse {
    pub fn decode(decoder: &mut Decoder, version: i16) -> Result<Self> {
        let broker_count = decoder.read_i32()?;
        let mut brokers = Vec::with_capacity(broker_count.max(0) as usize);
        for _ in 0..broker_count {
            let node_id = decoder.read_i32()?;
            let host = decoder.read_string()?.unwrap_or_default();
            let port = decoder.read_i32()?;
            let rack = if version >= 1 { decoder.read_string()? } else { None };
            brokers.push(MetadataBroker { node_id, host, port, rack });
        }

        let cluster_id = if version >= 2 { decoder.read_string()? } else { None };
        let controller_id = if version >= 1 { Some(decoder.read_i32()?) } else { None };

        let topic_count = decoder.read_i32()?;
        let mut topics = Vec::with_capacity(topic_count.max(0) as usize);
        for _ in 0..topic_count {
            let error_code = decoder.read_i16()?;
            let name = decoder.read_string()?.unwrap_or_default();
            let is_internal = if version >= 1 { decoder.read_bool()? } else { false };

            let partition_count = decoder.read_i32()?;
            let mut partitions = Vec::with_capacity(partition_count.max(0) as usize);
            for _ in 0..partition_count {
                let error_code = decoder.read_i16()?;
                let partition = decoder.read_i32()?;
                let leader = decoder.read_i32()?;
                let replicas = decoder.read_i32_array()?;
                let isr = decoder.read_i32_array()?;
                partitions.push(MetadataPartition { error_code, partition, leader, replicas, isr });
            }
            topics.push(MetadataTopic { error_code, name, is_internal, partitions });
        }

        Ok(MetadataResponse { brokers, cluster_id, controller_id, topics })
    }

    pub fn encode(&self, encoder: &mut Encoder, version: i16) -> Result<()> {
        encoder.write_i32(self.brokers.len() as i32);
        for broker in &self.brokers {
            encoder.write_i32(broker.node_id);
            encoder.write_string(Some(&broker.host));
            encoder.write_i32(broker.port);
            if version >= 1 {
                encoder.write_string(broker.rack.as_deref());
            }
        }

        if version >= 2 {
            encoder.write_string(self.cluster_id.as_deref());
        }
        if version >= 1 {
            encoder.write_i32(self.controller_id.unwrap_or(-1));
        }

        encoder.write_i32(self.topics.len() as i32);
        for topic in &self.topics {
            encoder.write_i16(topic.error_code);
            encoder.write_string(Some(&topic.name));
            if version >= 1 {
                encoder.write_bool(topic.is_internal);
            }
            encoder.write_i32(topic.partitions.len() as i32);
            for partition in &topic.partitions {
                encoder.write_i16(partition.error_code);
                encoder.write_i32(partition.partition);
                encoder.write_i32(partition.leader);
                encoder.write_i32_array(&partition.replicas);
                encoder.write_i32_array(&partition.isr);
            }
        }
        Ok(())
    }
}
