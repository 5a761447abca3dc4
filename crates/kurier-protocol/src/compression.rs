//! Message-set compression support.
//!
//! The low three bits of a message's attributes byte select the codec.
//! This client speaks gzip; the remaining codec ids are recognized but
//! rejected as unsupported.

use bytes::Bytes;
use flate2::read::{GzDecoder, GzEncoder};
use flate2::Compression;
use kurier_common::{Error, Result};
use std::io::Read;
use tracing::trace;

/// Mask selecting the codec bits of the attributes byte.
pub const ATTRIBUTE_CODEC_MASK: i8 = 0x07;

/// Kafka compression codec types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum CompressionType {
    None = 0,
    Gzip = 1,
    Snappy = 2,
    Lz4 = 3,
    Zstd = 4,
}

impl CompressionType {
    /// Create from codec ID
    pub fn from_id(id: i8) -> Option<Self> {
        match id {
            0 => Some(CompressionType::None),
            1 => Some(CompressionType::Gzip),
            2 => Some(CompressionType::Snappy),
            3 => Some(CompressionType::Lz4),
            4 => Some(CompressionType::Zstd),
            _ => None,
        }
    }

    /// Codec selected by an attributes byte
    pub fn from_attributes(attributes: i8) -> Option<Self> {
        Self::from_id(attributes & ATTRIBUTE_CODEC_MASK)
    }

    /// Get codec ID
    pub fn id(&self) -> i8 {
        *self as i8
    }

    /// Check if compression is enabled
    pub fn is_compressed(&self) -> bool {
        !matches!(self, CompressionType::None)
    }
}

/// Compress data using the specified codec.
pub fn compress(data: &[u8], codec: CompressionType) -> Result<Bytes> {
    match codec {
        CompressionType::None => Ok(Bytes::copy_from_slice(data)),
        CompressionType::Gzip => compress_gzip(data),
        other => Err(Error::UnsupportedCodec(other.id())),
    }
}

/// Decompress data using the specified codec.
pub fn decompress(data: &[u8], codec: CompressionType) -> Result<Bytes> {
    match codec {
        CompressionType::None => Ok(Bytes::copy_from_slice(data)),
        CompressionType::Gzip => decompress_gzip(data),
        other => Err(Error::UnsupportedCodec(other.id())),
    }
}

fn compress_gzip(data: &[u8]) -> Result<Bytes> {
    trace!("compressing {} bytes with gzip", data.len());
    let mut encoder = GzEncoder::new(data, Compression::default());
    let mut out = Vec::new();
    encoder.read_to_end(&mut out)?;
    Ok(Bytes::from(out))
}

fn decompress_gzip(data: &[u8]) -> Result<Bytes> {
    let mut decoder = GzDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    trace!("decompressed {} bytes to {}", data.len(), out.len());
    Ok(Bytes::from(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gzip_round_trip() {
        let payload = b"the quick brown fox jumps over the lazy dog".repeat(8);
        let packed = compress(&payload, CompressionType::Gzip).unwrap();
        assert!(packed.len() < payload.len());
        let unpacked = decompress(&packed, CompressionType::Gzip).unwrap();
        assert_eq!(unpacked, payload.as_slice());
    }

    #[test]
    fn unsupported_codecs_are_rejected() {
        for codec in [CompressionType::Snappy, CompressionType::Lz4, CompressionType::Zstd] {
            assert!(matches!(
                compress(b"x", codec),
                Err(Error::UnsupportedCodec(_))
            ));
        }
    }

    #[test]
    fn attribute_byte_maps_to_codec() {
        assert_eq!(CompressionType::from_attributes(0), Some(CompressionType::None));
        assert_eq!(CompressionType::from_attributes(1), Some(CompressionType::Gzip));
        // high bits are reserved and must not affect codec selection
        assert_eq!(CompressionType::from_attributes(0x08 | 1), Some(CompressionType::Gzip));
        assert_eq!(CompressionType::from_attributes(7), None);
    }
}
