//! Kafka wire protocol primitives.
//!
//! Big-endian reads and writes over `bytes` buffers, plus the scoped size
//! and CRC markers the message container format needs: reserve four bytes,
//! stream arbitrary content, then patch the reserved slot at scope end.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use kurier_common::{Error, Result};
use std::collections::HashMap;

/// Kafka API keys covered by this codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i16)]
pub enum ApiKey {
    Produce = 0,
    Fetch = 1,
    ListOffsets = 2,
    Metadata = 3,
    OffsetCommit = 8,
    OffsetFetch = 9,
    FindCoordinator = 10,
    JoinGroup = 11,
    Heartbeat = 12,
    LeaveGroup = 13,
    SyncGroup = 14,
    DescribeGroups = 15,
    ListGroups = 16,
    SaslHandshake = 17,
    ApiVersions = 18,
    CreateTopics = 19,
    DeleteTopics = 20,
}

impl ApiKey {
    /// Try to create an ApiKey from an i16
    pub fn from_i16(value: i16) -> Option<Self> {
        match value {
            0 => Some(ApiKey::Produce),
            1 => Some(ApiKey::Fetch),
            2 => Some(ApiKey::ListOffsets),
            3 => Some(ApiKey::Metadata),
            8 => Some(ApiKey::OffsetCommit),
            9 => Some(ApiKey::OffsetFetch),
            10 => Some(ApiKey::FindCoordinator),
            11 => Some(ApiKey::JoinGroup),
            12 => Some(ApiKey::Heartbeat),
            13 => Some(ApiKey::LeaveGroup),
            14 => Some(ApiKey::SyncGroup),
            15 => Some(ApiKey::DescribeGroups),
            16 => Some(ApiKey::ListGroups),
            17 => Some(ApiKey::SaslHandshake),
            18 => Some(ApiKey::ApiVersions),
            19 => Some(ApiKey::CreateTopics),
            20 => Some(ApiKey::DeleteTopics),
            _ => None,
        }
    }
}

/// Version range covered for an API
#[derive(Debug, Clone)]
pub struct VersionRange {
    pub min: i16,
    pub max: i16,
}

/// Reserved size-prefix slot; resolved by [`Encoder::end_size`].
#[must_use = "an unresolved size marker leaves four zero bytes on the wire"]
#[derive(Debug)]
pub struct SizeMarker(usize);

/// Reserved checksum slot; resolved by [`Encoder::end_crc`].
#[must_use = "an unresolved crc marker leaves four zero bytes on the wire"]
#[derive(Debug)]
pub struct CrcMarker(usize);

/// Protocol encoder for writing Kafka protocol primitives
pub struct Encoder<'a> {
    buf: &'a mut BytesMut,
}

impl<'a> Encoder<'a> {
    /// Create a new encoder
    pub fn new(buf: &'a mut BytesMut) -> Self {
        Self { buf }
    }

    /// Bytes written so far
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    /// Write a boolean
    pub fn write_bool(&mut self, value: bool) {
        self.buf.put_u8(if value { 1 } else { 0 });
    }

    /// Write an i8
    pub fn write_i8(&mut self, value: i8) {
        self.buf.put_i8(value);
    }

    /// Write an i16
    pub fn write_i16(&mut self, value: i16) {
        self.buf.put_i16(value);
    }

    /// Write an i32
    pub fn write_i32(&mut self, value: i32) {
        self.buf.put_i32(value);
    }

    /// Write an i64
    pub fn write_i64(&mut self, value: i64) {
        self.buf.put_i64(value);
    }

    /// Write a string (null = None)
    pub fn write_string(&mut self, value: Option<&str>) {
        match value {
            Some(s) => {
                self.write_i16(s.len() as i16);
                self.buf.put_slice(s.as_bytes());
            }
            None => {
                self.write_i16(-1);
            }
        }
    }

    /// Write a byte array (null = None)
    pub fn write_bytes(&mut self, value: Option<&[u8]>) {
        match value {
            Some(bytes) => {
                self.write_i32(bytes.len() as i32);
                self.buf.put_slice(bytes);
            }
            None => {
                self.write_i32(-1);
            }
        }
    }

    /// Write bytes with no length prefix
    pub fn write_raw_bytes(&mut self, value: &[u8]) {
        self.buf.put_slice(value);
    }

    /// Write an i32-counted array of strings
    pub fn write_string_array(&mut self, values: &[String]) {
        self.write_i32(values.len() as i32);
        for v in values {
            self.write_string(Some(v));
        }
    }

    /// Write an i32-counted array of i32s
    pub fn write_i32_array(&mut self, values: &[i32]) {
        self.write_i32(values.len() as i32);
        for v in values {
            self.write_i32(*v);
        }
    }

    /// Reserve a four-byte size prefix at the current position.
    ///
    /// [`end_size`](Self::end_size) patches it with the number of bytes
    /// written in between. Markers nest; resolve inner markers first.
    pub fn begin_size(&mut self) -> SizeMarker {
        let at = self.buf.len();
        self.buf.put_i32(0);
        SizeMarker(at)
    }

    /// Resolve a size marker with the bytes written since [`begin_size`](Self::begin_size).
    pub fn end_size(&mut self, marker: SizeMarker) {
        let size = (self.buf.len() - marker.0 - 4) as i32;
        self.buf[marker.0..marker.0 + 4].copy_from_slice(&size.to_be_bytes());
    }

    /// Reserve a four-byte checksum slot at the current position.
    ///
    /// [`end_crc`](Self::end_crc) patches it with the CRC-32 (IEEE) of the
    /// bytes written in between.
    pub fn begin_crc(&mut self) -> CrcMarker {
        let at = self.buf.len();
        self.buf.put_u32(0);
        CrcMarker(at)
    }

    /// Resolve a crc marker over the bytes written since [`begin_crc`](Self::begin_crc).
    pub fn end_crc(&mut self, marker: CrcMarker) {
        let crc = crc32fast::hash(&self.buf[marker.0 + 4..]);
        self.buf[marker.0..marker.0 + 4].copy_from_slice(&crc.to_be_bytes());
    }
}

/// Protocol decoder for reading Kafka protocol primitives.
///
/// Owns its input so checksums can be computed over upcoming bytes without
/// consuming them.
pub struct Decoder {
    buf: Bytes,
}

impl Decoder {
    /// Create a new decoder
    pub fn new(buf: Bytes) -> Self {
        Self { buf }
    }

    /// Bytes left before the logical end
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    /// Whether at least `n` bytes remain
    pub fn available(&self, n: usize) -> bool {
        self.buf.remaining() >= n
    }

    fn ensure(&self, n: usize, what: &str) -> Result<()> {
        if self.buf.remaining() < n {
            return Err(Error::BufferUnderRun(format!(
                "need {} bytes for {}, have {}",
                n,
                what,
                self.buf.remaining()
            )));
        }
        Ok(())
    }

    /// Read a boolean
    pub fn read_bool(&mut self) -> Result<bool> {
        self.ensure(1, "bool")?;
        Ok(self.buf.get_u8() != 0)
    }

    /// Read an i8
    pub fn read_i8(&mut self) -> Result<i8> {
        self.ensure(1, "i8")?;
        Ok(self.buf.get_i8())
    }

    /// Read an i16
    pub fn read_i16(&mut self) -> Result<i16> {
        self.ensure(2, "i16")?;
        Ok(self.buf.get_i16())
    }

    /// Read an i32
    pub fn read_i32(&mut self) -> Result<i32> {
        self.ensure(4, "i32")?;
        Ok(self.buf.get_i32())
    }

    /// Read a u32
    pub fn read_u32(&mut self) -> Result<u32> {
        self.ensure(4, "u32")?;
        Ok(self.buf.get_u32())
    }

    /// Read an i64
    pub fn read_i64(&mut self) -> Result<i64> {
        self.ensure(8, "i64")?;
        Ok(self.buf.get_i64())
    }

    /// Read a string (null = -1 length)
    pub fn read_string(&mut self) -> Result<Option<String>> {
        let len = self.read_i16()?;
        if len < 0 {
            return Ok(None);
        }

        let len = len as usize;
        self.ensure(len, "string")?;
        let mut bytes = vec![0u8; len];
        self.buf.copy_to_slice(&mut bytes);

        String::from_utf8(bytes)
            .map(Some)
            .map_err(|e| Error::Protocol(format!("invalid UTF-8 in string: {}", e)))
    }

    /// Read a byte array (null = -1 length)
    pub fn read_bytes(&mut self) -> Result<Option<Bytes>> {
        let len = self.read_i32()?;
        if len < 0 {
            return Ok(None);
        }

        let len = len as usize;
        self.ensure(len, "byte array")?;
        Ok(Some(self.buf.copy_to_bytes(len)))
    }

    /// Read exactly `n` bytes with no length prefix
    pub fn read_raw_bytes(&mut self, n: usize) -> Result<Bytes> {
        self.ensure(n, "raw bytes")?;
        Ok(self.buf.copy_to_bytes(n))
    }

    /// Read an i32-counted array of i32s
    pub fn read_i32_array(&mut self) -> Result<Vec<i32>> {
        let count = self.read_i32()?;
        let mut out = Vec::with_capacity(count.max(0) as usize);
        for _ in 0..count {
            out.push(self.read_i32()?);
        }
        Ok(out)
    }

    /// Skip `n` bytes
    pub fn advance(&mut self, n: usize) -> Result<()> {
        self.ensure(n, "skip")?;
        self.buf.advance(n);
        Ok(())
    }

    /// CRC-32 (IEEE) of the next `n` bytes, without consuming them.
    ///
    /// Used to validate the checksum that immediately precedes a message
    /// body.
    pub fn peek_crc(&self, n: usize) -> Result<u32> {
        self.ensure(n, "crc span")?;
        Ok(crc32fast::hash(&self.buf[..n]))
    }

    /// Split off the next `n` bytes into their own decoder.
    pub fn split_decoder(&mut self, n: usize) -> Result<Decoder> {
        self.ensure(n, "sub-buffer")?;
        Ok(Decoder::new(self.buf.split_to(n)))
    }
}

/// Version ranges this codec can encode and decode.
pub fn supported_api_versions() -> HashMap<ApiKey, VersionRange> {
    let mut versions = HashMap::new();

    versions.insert(ApiKey::Produce, VersionRange { min: 0, max: 2 });
    versions.insert(ApiKey::Fetch, VersionRange { min: 0, max: 3 });
    versions.insert(ApiKey::ListOffsets, VersionRange { min: 0, max: 1 });
    versions.insert(ApiKey::Metadata, VersionRange { min: 0, max: 2 });
    versions.insert(ApiKey::OffsetCommit, VersionRange { min: 0, max: 2 });
    versions.insert(ApiKey::OffsetFetch, VersionRange { min: 0, max: 1 });
    versions.insert(ApiKey::FindCoordinator, VersionRange { min: 0, max: 0 });
    versions.insert(ApiKey::JoinGroup, VersionRange { min: 0, max: 1 });
    versions.insert(ApiKey::Heartbeat, VersionRange { min: 0, max: 0 });
    versions.insert(ApiKey::LeaveGroup, VersionRange { min: 0, max: 0 });
    versions.insert(ApiKey::SyncGroup, VersionRange { min: 0, max: 0 });
    versions.insert(ApiKey::DescribeGroups, VersionRange { min: 0, max: 0 });
    versions.insert(ApiKey::ListGroups, VersionRange { min: 0, max: 0 });
    versions.insert(ApiKey::SaslHandshake, VersionRange { min: 0, max: 0 });
    versions.insert(ApiKey::ApiVersions, VersionRange { min: 0, max: 0 });
    versions.insert(ApiKey::CreateTopics, VersionRange { min: 0, max: 1 });
    versions.insert(ApiKey::DeleteTopics, VersionRange { min: 0, max: 0 });

    versions
}
