//! Unsigned LEB128 varint coding.
//!
//! Values are 7 bits per byte, low-order group first, with the high bit of
//! each byte signalling that another byte follows.

use crate::error::{Error, Result};
use bytes::BufMut;

/// Shift budget; a varint whose accumulated shift reaches this is rejected.
const SHIFT_LIMIT: u32 = 64;

/// Decode a varint starting at `offset`.
///
/// Returns the decoded value and the offset immediately past the last
/// consumed byte.
///
/// Values are fixed 64-bit. Besides the shift-count guard (which bounds a
/// varint to ten bytes), a tenth byte carrying bits above bit 63 is also
/// rejected with [`Error::VarintTooLong`] instead of being truncated.
///
/// # Errors
///
/// * [`Error::BufferUnderflow`] if the buffer ends before a byte with the
///   high bit clear is found.
/// * [`Error::VarintTooLong`] if the shift budget is exhausted.
pub fn decode_varint(data: &[u8], offset: usize) -> Result<(u64, usize)> {
    let mut value: u64 = 0;
    let mut shift: u32 = 0;
    let mut index = offset;

    loop {
        let Some(&byte) = data.get(index) else {
            return Err(Error::buffer_underflow(offset));
        };
        index += 1;

        let group = u64::from(byte & 0x7F);
        if shift == 63 && group > 1 {
            return Err(Error::varint_too_long(offset));
        }
        value |= group << shift;

        if byte & 0x80 == 0 {
            return Ok((value, index));
        }

        shift += 7;
        if shift >= SHIFT_LIMIT {
            return Err(Error::varint_too_long(offset));
        }
    }
}

/// Encode `value` as a varint.
///
/// `0` encodes to a single zero byte.
pub fn encode_varint(value: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(encoded_len(value));
    encode_varint_into(value, &mut buf);
    buf
}

/// Append the varint encoding of `value` to `buf`.
pub fn encode_varint_into(mut value: u64, buf: &mut impl BufMut) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            buf.put_u8(byte);
            return;
        }
        buf.put_u8(byte | 0x80);
    }
}

/// Number of bytes the varint encoding of `value` occupies.
pub fn encoded_len(value: u64) -> usize {
    let bits = 64 - (value | 1).leading_zeros() as usize;
    bits.div_ceil(7)
}
