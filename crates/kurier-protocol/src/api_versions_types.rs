//! ApiVersions API types (API key 18, version 0)

use kurier_common::Result;
use serde::{Deserialize, Serialize};

use crate::parser::{Decoder, Encoder};

/// ApiVersions request (empty body)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiVersionsRequest;

impl ApiVersionsRequest {
    pub fn encode(&self, _encoder: &mut Encoder, _version: i16) -> Result<()> {
        Ok(())
    }
}

/// ApiVersions response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiVersionsResponse {
    pub error_code: i16,
    pub api_versions: Vec<ApiVersionRange>,
}

/// Broker-supported version range for one API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiVersionRange {
    pub api_key: i16,
    pub min_version: i16,
    pub max_version: i16,
}

impl ApiVersionsResponse {
    pub fn decode(decoder: &mut Decoder, _version: i16) -> Result<Self> {
        let error_code = decoder.read_i16()?;
        let count = decoder.read_i32()?;
        let mut api_versions = Vec::with_capacity(count.max(0) as usize);
        for _ in 0..count {
            api_versions.push(ApiVersionRange {
                api_key: decoder.read_i16()?,
                min_version: decoder.read_i16()?,
                max_version: decoder.read_i16()?,
            });
        }
        Ok(ApiVersionsResponse { error_code, api_versions })
    }

    pub fn encode(&self, encoder: &mut Encoder, _version: i16) -> Result<()> {
        encoder.write_i16(self.error_code);
        encoder.write_i32(self.api_versions.len() as i32);
        for api in &self.api_versions {
            encoder.write_i16(api.api_key);
            encoder.write_i16(api.min_version);
            encoder.write_i16(api.max_version);
        }
        Ok(())
    }
}
