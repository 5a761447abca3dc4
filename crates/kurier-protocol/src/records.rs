//! Legacy Kafka message container handling (magic 0 and 1).
//!
//! A message set is a length-prefixed sequence of
//! `offset:i64 || message_size:i32 || message`, where each message carries
//! its own CRC. A compressed set is wrapped inside a single outer message
//! whose value holds the gzip'd inner set; the inner offsets are the
//! authoritative ones.

use bytes::{Bytes, BytesMut};
use kurier_common::{Error, Result};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::trace;

use crate::compression::{self, CompressionType};
use crate::parser::{Decoder, Encoder};

/// Smallest possible entry header: offset (8) + message_size (4).
///
/// A trailing fragment shorter than this is a fetch max-bytes artifact and
/// is silently dropped.
pub const MESSAGE_HEADER_SIZE: usize = 12;

/// A single message in the legacy container format.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Message {
    /// Entry offset; 0 for new messages, broker-assigned on the way back
    pub offset: i64,
    /// Container format version (0 or 1)
    pub magic: i8,
    /// Flags byte; low three bits select the compression codec
    pub attributes: i8,
    /// Create time in Unix milliseconds (magic 1 only)
    pub timestamp: Option<i64>,
    pub key: Option<Bytes>,
    pub value: Option<Bytes>,
}

impl Message {
    /// A fresh magic-0 message with offset 0.
    pub fn new(value: Option<Bytes>, key: Option<Bytes>) -> Self {
        Self {
            offset: 0,
            magic: 0,
            attributes: 0,
            timestamp: None,
            key,
            value,
        }
    }

    /// A fresh magic-1 message stamped with the given create time.
    pub fn with_timestamp(value: Option<Bytes>, key: Option<Bytes>, timestamp: i64) -> Self {
        Self {
            offset: 0,
            magic: 1,
            attributes: 0,
            timestamp: Some(timestamp),
            key,
            value,
        }
    }

    /// Codec selected by the attributes byte.
    pub fn codec(&self) -> Result<CompressionType> {
        CompressionType::from_attributes(self.attributes)
            .ok_or(Error::UnsupportedCodec(self.attributes & compression::ATTRIBUTE_CODEC_MASK))
    }
}

fn now_unix_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Encode one message inside a CRC scope.
///
/// Layout: `crc:u32 || magic:i8 || attributes:i8 || [timestamp:i64] ||
/// key:bytes || value:bytes`, timestamp present at magic 1 and stamped with
/// the current time when the message carries none.
pub fn write_message(encoder: &mut Encoder, message: &Message) {
    let crc = encoder.begin_crc();
    encoder.write_i8(message.magic);
    encoder.write_i8(message.attributes);
    if message.magic >= 1 {
        encoder.write_i64(message.timestamp.unwrap_or_else(now_unix_millis));
    }
    encoder.write_bytes(message.key.as_deref());
    encoder.write_bytes(message.value.as_deref());
    encoder.end_crc(crc);
}

/// Write raw message-set entries (no outer size prefix).
pub fn write_message_set_entries(encoder: &mut Encoder, messages: &[Message]) {
    for message in messages {
        encoder.write_i64(message.offset);
        let size = encoder.begin_size();
        write_message(encoder, message);
        encoder.end_size(size);
    }
}

/// Encode a size-prefixed message set with the chosen codec.
///
/// Returns the bytes saved by compression (uncompressed minus compressed
/// size; zero for an uncompressed set, negative when gzip inflates a tiny
/// set). The saved-bytes signal feeds produce telemetry.
pub fn write_message_set(
    encoder: &mut Encoder,
    messages: &[Message],
    codec: CompressionType,
) -> Result<i64> {
    match codec {
        CompressionType::None => {
            let size = encoder.begin_size();
            write_message_set_entries(encoder, messages);
            encoder.end_size(size);
            Ok(0)
        }
        CompressionType::Gzip => {
            // build the inner set separately, then wrap the gzip'd bytes in
            // a single magic-0 carrier message
            let mut inner = BytesMut::new();
            let mut inner_encoder = Encoder::new(&mut inner);
            write_message_set_entries(&mut inner_encoder, messages);
            let uncompressed = inner.len() as i64;
            let packed = compression::compress(&inner, CompressionType::Gzip)?;
            let saved = uncompressed - packed.len() as i64;

            let set_size = encoder.begin_size();
            encoder.write_i64(0);
            let wrapper_size = encoder.begin_size();
            let crc = encoder.begin_crc();
            encoder.write_i8(0);
            encoder.write_i8(CompressionType::Gzip.id());
            encoder.write_i32(-1); // null key
            let value_size = encoder.begin_size();
            encoder.write_raw_bytes(&packed);
            encoder.end_size(value_size);
            encoder.end_crc(crc);
            encoder.end_size(wrapper_size);
            encoder.end_size(set_size);
            Ok(saved)
        }
        other => Err(Error::UnsupportedCodec(other.id())),
    }
}

/// Decode a size-prefixed message set from the current position.
///
/// The declared size exceeding the buffer is a hard under-run; a trailing
/// entry cut off by the broker's fetch limit is tolerated.
pub fn read_message_set(decoder: &mut Decoder) -> Result<Vec<Message>> {
    let size = decoder.read_i32()?;
    if size < 0 {
        return Err(Error::Protocol(format!("negative message set size: {}", size)));
    }
    let set = decoder.split_decoder(size as usize)?;
    read_message_set_entries(set)
}

/// Decode raw message-set entries until the buffer runs dry.
fn read_message_set_entries(mut decoder: Decoder) -> Result<Vec<Message>> {
    let set_len = decoder.remaining();
    let mut messages = Vec::new();

    while decoder.available(MESSAGE_HEADER_SIZE) {
        let offset = decoder.read_i64()?;
        let message_size = decoder.read_i32()?;
        if message_size < 0 {
            return Err(Error::Protocol(format!("negative message size: {}", message_size)));
        }
        let message_size = message_size as usize;

        // a message the whole set could never hold means the fetch size is
        // insufficient, which the caller must surface
        if message_size > set_len - MESSAGE_HEADER_SIZE {
            return Err(Error::BufferUnderRun(format!(
                "declared message size {} exceeds set capacity {}",
                message_size,
                set_len - MESSAGE_HEADER_SIZE
            )));
        }

        // partial trailing message: the broker hit its fetch byte limit
        if !decoder.available(message_size) {
            trace!(
                "dropping partial trailing message ({} of {} bytes)",
                decoder.remaining(),
                message_size
            );
            break;
        }

        let body = decoder.split_decoder(message_size)?;
        read_message(body, offset, &mut messages)?;
    }

    Ok(messages)
}

/// Decode one message body, expanding compressed wrappers recursively.
fn read_message(mut decoder: Decoder, offset: i64, out: &mut Vec<Message>) -> Result<()> {
    let stored = decoder.read_u32()?;
    let computed = decoder.peek_crc(decoder.remaining())?;
    if stored != computed {
        return Err(Error::CrcMismatch { stored, computed });
    }

    let magic = decoder.read_i8()?;
    let attributes = decoder.read_i8()?;
    let timestamp = if magic >= 1 {
        let millis = decoder.read_i64()?;
        (millis >= 0).then_some(millis)
    } else {
        None
    };
    let key = decoder.read_bytes()?;

    let codec = CompressionType::from_attributes(attributes)
        .ok_or(Error::UnsupportedCodec(attributes & compression::ATTRIBUTE_CODEC_MASK))?;
    match codec {
        CompressionType::None => {
            let value = decoder.read_bytes()?;
            out.push(Message { offset, magic, attributes, timestamp, key, value });
            Ok(())
        }
        CompressionType::Gzip => {
            // the value holds a gzip'd inner set; its entries carry the
            // authoritative offsets
            let packed = decoder
                .read_bytes()?
                .ok_or_else(|| Error::Protocol("compressed wrapper with null value".into()))?;
            let inner = compression::decompress(&packed, CompressionType::Gzip)?;
            let expanded = read_message_set_entries(Decoder::new(inner))?;
            out.extend(expanded);
            Ok(())
        }
        other => Err(Error::UnsupportedCodec(other.id())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_entries(messages: &[Message]) -> BytesMut {
        let mut buf = BytesMut::new();
        let mut encoder = Encoder::new(&mut buf);
        write_message_set_entries(&mut encoder, messages);
        buf
    }

    fn decode_entries(buf: Bytes) -> Result<Vec<Message>> {
        read_message_set_entries(Decoder::new(buf))
    }

    #[test]
    fn message_round_trip_all_nullability() {
        let cases = [
            (Some(Bytes::from_static(b"value")), Some(Bytes::from_static(b"key"))),
            (Some(Bytes::from_static(b"value")), None),
            (None, Some(Bytes::from_static(b"key"))),
            (None, None),
        ];
        for (value, key) in cases {
            let message = Message::new(value.clone(), key.clone());
            let decoded = decode_entries(encode_entries(&[message]).freeze()).unwrap();
            assert_eq!(decoded.len(), 1);
            assert_eq!(decoded[0].key, key);
            assert_eq!(decoded[0].value, value);
            assert_eq!(decoded[0].offset, 0);
        }
    }

    #[test]
    fn magic_one_timestamp_round_trip() {
        let message = Message::with_timestamp(
            Some(Bytes::from_static(b"v")),
            None,
            1_500_000_000_000,
        );
        let decoded = decode_entries(encode_entries(&[message]).freeze()).unwrap();
        assert_eq!(decoded[0].magic, 1);
        assert_eq!(decoded[0].timestamp, Some(1_500_000_000_000));
    }

    #[test]
    fn magic_one_negative_timestamp_decodes_as_none() {
        let mut message = Message::new(Some(Bytes::from_static(b"v")), None);
        message.magic = 1;
        message.timestamp = Some(-1);
        let decoded = decode_entries(encode_entries(&[message]).freeze()).unwrap();
        assert_eq!(decoded[0].timestamp, None);
    }

    #[test]
    fn offsets_survive_reassignment() {
        let mut messages = vec![
            Message::new(Some(Bytes::from_static(b"a")), None),
            Message::new(Some(Bytes::from_static(b"b")), None),
        ];
        messages[0].offset = 41;
        messages[1].offset = 42;
        let decoded = decode_entries(encode_entries(&messages).freeze()).unwrap();
        assert_eq!(decoded[0].offset, 41);
        assert_eq!(decoded[1].offset, 42);
    }

    #[test]
    fn corrupt_body_fails_crc() {
        let message = Message::new(Some(Bytes::from_static(b"payload")), None);
        let buf = encode_entries(&[message]);
        // flip one bit in every body position past the crc field
        for bit_target in MESSAGE_HEADER_SIZE + 4..buf.len() {
            let mut corrupted = buf.clone();
            corrupted[bit_target] ^= 0x01;
            let result = decode_entries(corrupted.freeze());
            assert!(
                matches!(result, Err(Error::CrcMismatch { .. })),
                "bit flip at {} not caught",
                bit_target
            );
        }
    }

    #[test]
    fn gzip_set_round_trip() {
        let messages: Vec<Message> = (0..16)
            .map(|i| {
                let mut m = Message::new(
                    Some(Bytes::from(format!("value-{}", i))),
                    Some(Bytes::from(format!("key-{}", i))),
                );
                m.offset = i;
                m
            })
            .collect();

        let mut buf = BytesMut::new();
        let mut encoder = Encoder::new(&mut buf);
        let saved = write_message_set(&mut encoder, &messages, CompressionType::Gzip).unwrap();
        assert_ne!(saved, 0);

        let mut decoder = Decoder::new(buf.freeze());
        let decoded = read_message_set(&mut decoder).unwrap();
        assert_eq!(decoded.len(), messages.len());
        for (got, want) in decoded.iter().zip(&messages) {
            assert_eq!(got.offset, want.offset);
            assert_eq!(got.key, want.key);
            assert_eq!(got.value, want.value);
        }
    }

    #[test]
    fn short_trailing_fragment_is_dropped() {
        let messages = vec![
            Message::new(Some(Bytes::from_static(b"one")), None),
            Message::new(Some(Bytes::from_static(b"two")), None),
        ];
        let buf = encode_entries(&messages);
        // keep the first entry plus 11 bytes of the second entry's header
        let first_len = encode_entries(&messages[..1]).len();
        let truncated = buf.freeze().slice(..first_len + MESSAGE_HEADER_SIZE - 1);
        let decoded = decode_entries(truncated).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].value, Some(Bytes::from_static(b"one")));
    }

    #[test]
    fn partial_trailing_body_is_tolerated() {
        let messages = vec![
            Message::new(Some(Bytes::from_static(b"complete")), None),
            Message::new(Some(Bytes::from_static(b"cut-off")), None),
        ];
        let buf = encode_entries(&messages);
        // header of the second entry fits, body does not
        let first_len = encode_entries(&messages[..1]).len();
        let truncated = buf.freeze().slice(..first_len + MESSAGE_HEADER_SIZE + 3);
        let decoded = decode_entries(truncated).unwrap();
        assert_eq!(decoded.len(), 1);
    }

    #[test]
    fn declared_set_size_past_buffer_fails() {
        let mut buf = BytesMut::new();
        let mut encoder = Encoder::new(&mut buf);
        encoder.write_i32(64); // declared size with only 2 bytes behind it
        encoder.write_i16(0);
        let mut decoder = Decoder::new(buf.freeze());
        assert!(matches!(
            read_message_set(&mut decoder),
            Err(Error::BufferUnderRun(_))
        ));
    }

    #[test]
    fn oversized_declared_message_fails() {
        let mut buf = BytesMut::new();
        let mut encoder = Encoder::new(&mut buf);
        encoder.write_i64(0);
        encoder.write_i32(1024); // larger than the whole set could hold
        encoder.write_raw_bytes(&[0u8; 16]);
        let result = decode_entries(buf.freeze());
        assert!(matches!(result, Err(Error::BufferUnderRun(_))));
    }
}
