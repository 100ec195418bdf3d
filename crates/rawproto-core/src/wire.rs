//! Wire-format data model.
//!
//! Each protobuf field is encoded as:
//! - A varint "tag" containing the field number and wire type
//! - The field data (format depends on wire type)
//!
//! Supported wire types:
//! - 0: VARINT (int32, int64, uint32, uint64, sint32, sint64, bool, enum)
//! - 1: I64 (fixed64, sfixed64, double)
//! - 2: LEN (string, bytes, embedded messages, packed repeated fields)
//! - 5: I32 (fixed32, sfixed32, float)
//!
//! The deprecated group markers (3 and 4) are rejected.

use std::fmt;

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::MAX_FIELD_NUMBER;

/// Protobuf wire types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    /// Variable-length integer
    Varint = 0,
    /// 64-bit fixed-width
    I64 = 1,
    /// Length-delimited (strings, bytes, embedded messages)
    Len = 2,
    /// 32-bit fixed-width
    I32 = 5,
}

impl WireType {
    /// Resolve the low three bits of a tag, reporting `offset` on failure.
    pub fn from_raw(raw: u64, offset: usize) -> Result<Self> {
        match raw {
            0 => Ok(WireType::Varint),
            1 => Ok(WireType::I64),
            2 => Ok(WireType::Len),
            5 => Ok(WireType::I32),
            _ => Err(Error::unsupported_wire_type(raw, offset)),
        }
    }

    /// Short uppercase name, as used in diagnostics
    pub fn as_str(&self) -> &'static str {
        match self {
            WireType::Varint => "VARINT",
            WireType::I64 => "I64",
            WireType::Len => "LEN",
            WireType::I32 => "I32",
        }
    }
}

impl TryFrom<u8> for WireType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::from_raw(u64::from(value), 0)
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compose a tag from a field number and wire type.
pub fn make_tag(field_number: u32, wire_type: WireType) -> u64 {
    (u64::from(field_number) << 3) | wire_type as u64
}

/// Split a tag into `(field_number, raw_wire_type)`.
pub fn split_tag(tag: u64) -> (u64, u64) {
    (tag >> 3, tag & 0x07)
}

/// Check that `number` is a usable field number (`1..=MAX_FIELD_NUMBER`).
pub fn validate_field_number(number: u64, offset: usize) -> Result<u32> {
    match u32::try_from(number) {
        Ok(n) if n != 0 && n <= MAX_FIELD_NUMBER => Ok(n),
        _ => Err(Error::invalid_field(number, offset)),
    }
}

/// Payload of a LEN field.
///
/// Decoding only ever produces [`LenValue::Text`]: the UTF-8 contents when
/// the payload is valid UTF-8, otherwise its lowercase hex rendering. The two
/// cases are indistinguishable afterwards, which is why re-encoding is a
/// heuristic (see [`crate::encode::len_payload`]). [`LenValue::Bytes`] is for
/// callers that hold raw bytes and want them emitted unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LenValue {
    /// UTF-8 text or a lowercase hex string
    Text(String),
    /// Raw bytes, emitted as-is
    Bytes(Bytes),
}

impl fmt::Display for LenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LenValue::Text(text) => write!(f, "{:?}", text),
            LenValue::Bytes(bytes) => write!(f, "0x{}", hex::encode(bytes)),
        }
    }
}

/// Value of a single field; the variant fixes the wire type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// VARINT value
    Varint(u64),
    /// I64 value, raw bits
    I64(u64),
    /// LEN payload
    Len(LenValue),
    /// I32 value, raw bits
    I32(u32),
}

impl FieldValue {
    /// The wire type this value is encoded with
    pub fn wire_type(&self) -> WireType {
        match self {
            FieldValue::Varint(_) => WireType::Varint,
            FieldValue::I64(_) => WireType::I64,
            FieldValue::Len(_) => WireType::Len,
            FieldValue::I32(_) => WireType::I32,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Varint(v) | FieldValue::I64(v) => write!(f, "{}", v),
            FieldValue::I32(v) => write!(f, "{}", v),
            FieldValue::Len(v) => write!(f, "{}", v),
        }
    }
}

/// One decoded `(field_number, wire_type, value)` record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field number, `1..=MAX_FIELD_NUMBER`
    pub number: u32,
    /// The value, which also determines the wire type
    pub value: FieldValue,
}

impl Field {
    /// Creates a new field record
    pub fn new(number: u32, value: FieldValue) -> Self {
        Self { number, value }
    }

    /// Creates a VARINT field
    pub fn varint(number: u32, value: u64) -> Self {
        Self::new(number, FieldValue::Varint(value))
    }

    /// Creates an I64 field
    pub fn fixed64(number: u32, value: u64) -> Self {
        Self::new(number, FieldValue::I64(value))
    }

    /// Creates an I32 field
    pub fn fixed32(number: u32, value: u32) -> Self {
        Self::new(number, FieldValue::I32(value))
    }

    /// Creates a LEN field holding text (or hex text)
    pub fn text(number: u32, value: impl Into<String>) -> Self {
        Self::new(number, FieldValue::Len(LenValue::Text(value.into())))
    }

    /// Creates a LEN field holding raw bytes
    pub fn bytes(number: u32, value: impl Into<Bytes>) -> Self {
        Self::new(number, FieldValue::Len(LenValue::Bytes(value.into())))
    }

    /// The wire type of this record
    pub fn wire_type(&self) -> WireType {
        self.value.wire_type()
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} {}", self.number, self.wire_type(), self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_type_conversion() {
        assert_eq!(WireType::try_from(0).unwrap(), WireType::Varint);
        assert_eq!(WireType::try_from(1).unwrap(), WireType::I64);
        assert_eq!(WireType::try_from(2).unwrap(), WireType::Len);
        assert_eq!(WireType::try_from(5).unwrap(), WireType::I32);
        for raw in [3u8, 4, 6, 7] {
            assert_eq!(
                WireType::try_from(raw),
                Err(Error::unsupported_wire_type(u64::from(raw), 0))
            );
        }
    }

    #[test]
    fn test_tags() {
        assert_eq!(make_tag(1, WireType::Varint), 0x08);
        assert_eq!(make_tag(2, WireType::Len), 0x12);
        assert_eq!(split_tag(0x12), (2, 2));
        assert_eq!(split_tag(0x0B), (1, 3));
    }

    #[test]
    fn test_validate_field_number() {
        assert_eq!(validate_field_number(1, 0), Ok(1));
        assert_eq!(validate_field_number(u64::from(MAX_FIELD_NUMBER), 0), Ok(MAX_FIELD_NUMBER));
        assert!(validate_field_number(0, 0).is_err());
        assert!(validate_field_number(u64::from(MAX_FIELD_NUMBER) + 1, 0).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Field::varint(1, 150).to_string(), "1:VARINT 150");
        assert_eq!(Field::text(2, "testing").to_string(), "2:LEN \"testing\"");
        assert_eq!(Field::bytes(3, vec![0xde, 0xad]).to_string(), "3:LEN 0xdead");
    }
}
