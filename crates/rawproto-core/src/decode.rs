//! Schema-less wire-format parser.
//!
//! [`decode`] walks a buffer tag by tag and produces the ordered list of
//! field records. LEN payloads are never descended into; they are classified
//! as UTF-8 text or, failing that, hex by [`classify_len`].

use tracing::{debug, trace};

use crate::convert::{bytes_to_hex, hex_to_bytes};
use crate::error::{Error, Result};
use crate::fixed::{decode_fixed32, decode_fixed64};
use crate::varint::decode_varint;
use crate::wire::{split_tag, validate_field_number, Field, FieldValue, LenValue, WireType};

/// Decode a complete message.
///
/// Empty input yields an empty list. Any malformed field aborts the whole
/// call; no partial results are returned.
pub fn decode(data: &[u8]) -> Result<Vec<Field>> {
    debug!("Decoding {} bytes", data.len());

    let mut fields = Vec::new();
    let mut position = 0;

    while position < data.len() {
        let (field, next) = decode_field(data, position)?;
        trace!(
            "Field {} ({}) at {}..{}",
            field.number,
            field.wire_type(),
            position,
            next
        );
        fields.push(field);
        position = next;
    }

    debug!("Decoded {} fields", fields.len());
    Ok(fields)
}

/// Decode a message given as a hex string (optionally `0x`-prefixed).
pub fn decode_hex(input: &str) -> Result<Vec<Field>> {
    decode(&hex_to_bytes(input)?)
}

/// Decode the single field starting at `offset`.
///
/// Returns the record and the offset just past it.
pub fn decode_field(data: &[u8], offset: usize) -> Result<(Field, usize)> {
    let (tag, mut position) = decode_varint(data, offset)?;
    let (number, raw_wire) = split_tag(tag);
    let number = validate_field_number(number, offset)?;
    let wire_type = WireType::from_raw(raw_wire, offset)?;

    let value = match wire_type {
        WireType::Varint => {
            let (value, next) = decode_varint(data, position)?;
            position = next;
            FieldValue::Varint(value)
        }
        WireType::I64 => {
            ensure_available(data, position, 8, wire_type)?;
            let (value, next) = decode_fixed64(data, position)?;
            position = next;
            FieldValue::I64(value)
        }
        WireType::Len => {
            let (length, start) = decode_varint(data, position)?;
            ensure_available(data, start, length, wire_type)?;
            // Bounded by the remaining buffer length.
            let end = start + length as usize;
            position = end;
            FieldValue::Len(classify_len(&data[start..end]))
        }
        WireType::I32 => {
            ensure_available(data, position, 4, wire_type)?;
            let (value, next) = decode_fixed32(data, position)?;
            position = next;
            FieldValue::I32(value)
        }
    };

    Ok((Field::new(number, value), position))
}

/// Classify a LEN payload: UTF-8 text when valid, lowercase hex otherwise.
///
/// This is lossy: the result does not record which branch was taken, so
/// bytes that are themselves valid hex-digit text cannot be told apart from
/// hex-rendered binary afterwards.
pub fn classify_len(payload: &[u8]) -> LenValue {
    match std::str::from_utf8(payload) {
        Ok(text) => LenValue::Text(text.to_owned()),
        Err(_) => LenValue::Text(bytes_to_hex(payload)),
    }
}

fn ensure_available(data: &[u8], offset: usize, needed: u64, wire_type: WireType) -> Result<()> {
    let available = data.len().saturating_sub(offset);
    if needed > available as u64 {
        return Err(Error::buffer_overflow(offset, wire_type.as_str(), needed, available));
    }
    Ok(())
}
