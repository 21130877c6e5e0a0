//! The byte encoding used for full-state packets, partial updates and change notifications.
//!
//! Integers are big-endian. Strings are a VarInt byte length followed by UTF-8.

use crate::DepotId;
use thiserror::Error;

/// Replaces a depot's whole route list: i32 count, then that many i64 route IDs.
pub const KEY_ROUTE_IDS: &str = "route_ids";
/// Replaces a depot's whole frequency table: 24 consecutive i32 values.
pub const KEY_FREQUENCIES: &str = "frequencies";
/// Renames an entity: one string.
pub const KEY_NAME: &str = "name";
/// Replaces an entity's area.
pub const KEY_AREA: &str = "area";

/// The longest string accepted when reading.
const MAX_STRING_LEN: usize = 32767;

/// A malformed packet.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PacketError {
    #[error("packet ended early: needed {needed} bytes but {remaining} remain")]
    UnexpectedEnd { needed: usize, remaining: usize },
    #[error("VarInt is longer than 5 bytes")]
    VarIntTooLong,
    #[error("invalid length {0}")]
    InvalidLength(i64),
    #[error("string is not valid UTF-8")]
    InvalidString,
    #[error("unknown {kind} tag {tag:?}")]
    UnknownTag { kind: &'static str, tag: String },
    #[error("no depot with ID {0}")]
    UnknownDepot(DepotId),
}

/// Appends values to a packet buffer.
#[derive(Clone, Debug, Default)]
pub struct PacketWriter {
    buf: Vec<u8>,
}

impl PacketWriter {
    /// Creates an empty packet.
    pub fn new() -> Self {
        Default::default()
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_i64(&mut self, value: i64) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_var_int(&mut self, value: i32) {
        let mut value = value as u32;
        loop {
            if value & !0x7F == 0 {
                self.buf.push(value as u8);
                return;
            }
            self.buf.push((value & 0x7F) as u8 | 0x80);
            value >>= 7;
        }
    }

    pub fn write_string(&mut self, value: &str) {
        self.write_var_int(value.len() as i32);
        self.buf.extend_from_slice(value.as_bytes());
    }

    /// Writes an i32 count followed by each value as an i64.
    pub fn write_i64_list(&mut self, values: impl ExactSizeIterator<Item = i64>) {
        self.write_i32(values.len() as i32);
        for value in values {
            self.write_i64(value);
        }
    }

    /// The number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Finishes the packet.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Reads values from the front of a packet.
#[derive(Clone, Debug)]
pub struct PacketReader<'a> {
    bytes: &'a [u8],
}

impl<'a> PacketReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// The number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.bytes.len()
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], PacketError> {
        if self.bytes.len() < N {
            return Err(PacketError::UnexpectedEnd {
                needed: N,
                remaining: self.bytes.len(),
            });
        }
        let (head, tail) = self.bytes.split_at(N);
        self.bytes = tail;
        let mut out = [0; N];
        out.copy_from_slice(head);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, PacketError> {
        Ok(self.take::<1>()?[0])
    }

    pub fn read_i32(&mut self) -> Result<i32, PacketError> {
        Ok(i32::from_be_bytes(self.take()?))
    }

    pub fn read_i64(&mut self) -> Result<i64, PacketError> {
        Ok(i64::from_be_bytes(self.take()?))
    }

    pub fn read_var_int(&mut self) -> Result<i32, PacketError> {
        let mut value = 0u32;
        for i in 0..5 {
            let byte = self.read_u8()?;
            value |= ((byte & 0x7F) as u32) << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(value as i32);
            }
        }
        Err(PacketError::VarIntTooLong)
    }

    pub fn read_string(&mut self) -> Result<String, PacketError> {
        let len = self.read_var_int()?;
        let len = self.checked_len(len as i64, 1)?;
        if len > MAX_STRING_LEN {
            return Err(PacketError::InvalidLength(len as i64));
        }
        let (head, tail) = self.bytes.split_at(len);
        self.bytes = tail;
        String::from_utf8(head.to_vec()).map_err(|_| PacketError::InvalidString)
    }

    /// Reads an i32 count followed by that many i64 values.
    pub fn read_i64_list(&mut self) -> Result<Vec<i64>, PacketError> {
        let count = self.read_i32()?;
        let count = self.checked_len(count as i64, 8)?;
        (0..count).map(|_| self.read_i64()).collect()
    }

    /// Checks a length prefix against the bytes left, so a corrupt count cannot trigger a huge allocation.
    fn checked_len(&self, len: i64, item_size: usize) -> Result<usize, PacketError> {
        if len < 0 {
            return Err(PacketError::InvalidLength(len));
        }
        let len = len as usize;
        let needed = len.saturating_mul(item_size);
        if needed > self.bytes.len() {
            return Err(PacketError::UnexpectedEnd {
                needed,
                remaining: self.bytes.len(),
            });
        }
        Ok(len)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn integers_are_big_endian() {
        let mut writer = PacketWriter::new();
        writer.write_i32(0x0102_0304);
        writer.write_i64(-2);
        assert_eq!(
            writer.into_bytes(),
            vec![1, 2, 3, 4, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE]
        );
    }

    #[test]
    fn var_int_encoding() {
        for (value, bytes) in [
            (0, vec![0x00]),
            (1, vec![0x01]),
            (127, vec![0x7F]),
            (128, vec![0x80, 0x01]),
            (300, vec![0xAC, 0x02]),
            (-1, vec![0xFF, 0xFF, 0xFF, 0xFF, 0x0F]),
        ] {
            let mut writer = PacketWriter::new();
            writer.write_var_int(value);
            let encoded = writer.into_bytes();
            assert_eq!(encoded, bytes);
            assert_eq!(PacketReader::new(&encoded).read_var_int(), Ok(value));
        }
    }

    #[test]
    fn strings_and_lists() {
        let mut writer = PacketWriter::new();
        writer.write_string("Depot Nord");
        writer.write_i64_list([5i64, 9, -1].into_iter());
        let bytes = writer.into_bytes();

        let mut reader = PacketReader::new(&bytes);
        assert_eq!(reader.read_string().as_deref(), Ok("Depot Nord"));
        assert_eq!(reader.read_i64_list(), Ok(vec![5, 9, -1]));
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn truncated_packets_fail() {
        let mut reader = PacketReader::new(&[0, 0, 1]);
        assert_eq!(
            reader.read_i32(),
            Err(PacketError::UnexpectedEnd {
                needed: 4,
                remaining: 3
            })
        );

        // A count claiming far more IDs than the packet holds.
        let mut writer = PacketWriter::new();
        writer.write_i32(1_000_000);
        writer.write_i64(1);
        let bytes = writer.into_bytes();
        assert!(matches!(
            PacketReader::new(&bytes).read_i64_list(),
            Err(PacketError::UnexpectedEnd { .. })
        ));

        let mut writer = PacketWriter::new();
        writer.write_i32(-1);
        let bytes = writer.into_bytes();
        assert_eq!(
            PacketReader::new(&bytes).read_i64_list(),
            Err(PacketError::InvalidLength(-1))
        );
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let bytes = [2, 0xC3, 0x28];
        assert_eq!(
            PacketReader::new(&bytes).read_string(),
            Err(PacketError::InvalidString)
        );
    }
}
