//! Length-prefixed framing for Kafka protocol streams.
//!
//! Every request and response on the wire is `length:i32 || payload`. This
//! codec splits a byte stream into complete payloads and puts the prefix
//! back on the way out.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::trace;

use kurier_common::{Error, Result};

/// Maximum frame size (100MB) to prevent OOM on a corrupt length prefix
pub const MAX_FRAME_SIZE: usize = 100 * 1024 * 1024;

/// Minimum frame size: a response payload is at least its correlation id
const MIN_FRAME_SIZE: usize = 4;

/// Kafka protocol frame decoder/encoder
pub struct FrameCodec {
    max_frame_size: usize,
}

impl FrameCodec {
    /// Create a new frame codec with default settings
    pub fn new() -> Self {
        Self { max_frame_size: MAX_FRAME_SIZE }
    }

    /// Create a new frame codec with custom max frame size
    pub fn with_max_frame_size(max_frame_size: usize) -> Self {
        Self { max_frame_size }
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for FrameCodec {
    type Item = Bytes;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if src.len() < 4 {
            return Ok(None);
        }

        let mut length_bytes = [0u8; 4];
        length_bytes.copy_from_slice(&src[..4]);
        let length = i32::from_be_bytes(length_bytes);

        if (length as usize) < MIN_FRAME_SIZE || length < 0 {
            return Err(Error::Protocol(format!(
                "frame size {} is below minimum {}",
                length, MIN_FRAME_SIZE
            )));
        }
        let length = length as usize;

        if length > self.max_frame_size {
            return Err(Error::Protocol(format!(
                "frame size {} exceeds maximum {}",
                length, self.max_frame_size
            )));
        }

        if src.len() < 4 + length {
            trace!("waiting for complete frame, have {} of {} bytes", src.len(), 4 + length);
            src.reserve(4 + length - src.len());
            return Ok(None);
        }

        src.advance(4);
        Ok(Some(src.split_to(length).freeze()))
    }
}

impl Encoder<Bytes> for FrameCodec {
    type Error = Error;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<()> {
        if item.len() > self.max_frame_size {
            return Err(Error::Protocol(format!(
                "frame size {} exceeds maximum {}",
                item.len(),
                self.max_frame_size
            )));
        }

        dst.reserve(4 + item.len());
        dst.put_i32(item.len() as i32);
        dst.put(item);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_waits_for_complete_frame() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::new();

        buf.put_u8(0);
        buf.put_u8(0);
        assert!(codec.decode(&mut buf).unwrap().is_none());

        buf.put_u8(0);
        buf.put_u8(20);
        assert!(codec.decode(&mut buf).unwrap().is_none());

        buf.put_slice(&[0u8; 20]);
        let frame = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(frame.len(), 20);
        assert_eq!(buf.len(), 0);
    }

    #[test]
    fn encode_prepends_length() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::new();

        codec.encode(Bytes::from(vec![7u8; 100]), &mut buf).unwrap();
        assert_eq!(buf.len(), 104);
        assert_eq!(buf.get_i32(), 100);
    }

    #[test]
    fn oversized_frame_is_rejected() {
        let mut codec = FrameCodec::with_max_frame_size(1000);
        let mut buf = BytesMut::new();
        assert!(codec.encode(Bytes::from(vec![0u8; 2000]), &mut buf).is_err());

        let mut src = BytesMut::new();
        src.put_i32(5000);
        src.put_slice(&[0u8; 8]);
        assert!(codec.decode(&mut src).is_err());
    }
}
