//! Record encoding/decoding for storage
//!
//! Layouts (big endian):
//!
//! ```text
//! slot:  | version: u8 | len: u32 | utf-8 bytes |
//! price: | version: u8 | value: f64 | last_updated: u64 |
//! ```

use std::io::{Cursor, Read};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use thiserror::Error;

const PRICE_LEN: usize = 1 + 8 + 8;

/// Errors that can occur during decoding
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// Input is shorter than the layout requires
    #[error("truncated record")]
    Truncated,
    /// Input carries bytes past the end of the record
    #[error("trailing bytes after record")]
    TrailingBytes,
    /// Slot payload is not valid utf-8
    #[error("slot value is not valid utf-8")]
    InvalidUtf8,
}

impl From<std::io::Error> for DecodeError {
    fn from(_: std::io::Error) -> Self {
        // Reads from an in-memory cursor only fail on EOF.
        DecodeError::Truncated
    }
}

/// Slot value structure for storage
#[derive(Debug, Clone, PartialEq)]
pub struct SlotValue {
    /// Format version
    pub version: u8,
    /// Slot text
    pub text: String,
}

impl SlotValue {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            version: super::CURRENT_VERSION,
            text: text.into(),
        }
    }

    /// Serialize to bytes
    pub fn serialize(&self) -> Vec<u8> {
        let bytes = self.text.as_bytes();
        let mut buf = Vec::with_capacity(1 + 4 + bytes.len());
        buf.push(self.version);
        // Writes into a Vec never fail.
        let _ = buf.write_u32::<BigEndian>(bytes.len() as u32);
        buf.extend_from_slice(bytes);
        buf
    }

    /// Deserialize from bytes
    pub fn deserialize(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut cursor = Cursor::new(bytes);
        let version = cursor.read_u8()?;
        let len = cursor.read_u32::<BigEndian>()? as usize;

        let remaining = bytes.len() - cursor.position() as usize;
        if remaining < len {
            return Err(DecodeError::Truncated);
        }
        if remaining > len {
            return Err(DecodeError::TrailingBytes);
        }

        let mut data = vec![0u8; len];
        cursor.read_exact(&mut data)?;
        let text = String::from_utf8(data).map_err(|_| DecodeError::InvalidUtf8)?;

        Ok(Self { version, text })
    }
}

/// Price record structure for storage
///
/// Value and timestamp share one encoded record so a backend can only ever
/// store or load them together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceValue {
    /// Format version
    pub version: u8,
    pub value: f64,
    /// Nanoseconds since the Unix epoch
    pub last_updated: u64,
}

impl PriceValue {
    pub fn new(value: f64, last_updated: u64) -> Self {
        Self {
            version: super::CURRENT_VERSION,
            value,
            last_updated,
        }
    }

    /// Serialize to bytes
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(PRICE_LEN);
        buf.push(self.version);
        let _ = buf.write_f64::<BigEndian>(self.value);
        let _ = buf.write_u64::<BigEndian>(self.last_updated);
        buf
    }

    /// Deserialize from bytes
    pub fn deserialize(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.len() > PRICE_LEN {
            return Err(DecodeError::TrailingBytes);
        }

        let mut cursor = Cursor::new(bytes);
        let version = cursor.read_u8()?;
        let value = cursor.read_f64::<BigEndian>()?;
        let last_updated = cursor.read_u64::<BigEndian>()?;

        Ok(Self {
            version,
            value,
            last_updated,
        })
    }
}
