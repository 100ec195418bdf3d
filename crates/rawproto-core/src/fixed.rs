//! Fixed-width little-endian values for the I32 and I64 wire types.
//!
//! Values are raw unsigned bit patterns; signed and floating point
//! interpretations are left to the caller.

use crate::error::{Error, Result};
use bytes::BufMut;

/// Read a little-endian `u32` at `offset`, returning it and the next offset.
pub fn decode_fixed32(data: &[u8], offset: usize) -> Result<(u32, usize)> {
    let bytes = take::<4>(data, offset)?;
    Ok((u32::from_le_bytes(bytes), offset + 4))
}

/// Read a little-endian `u64` at `offset`, returning it and the next offset.
pub fn decode_fixed64(data: &[u8], offset: usize) -> Result<(u64, usize)> {
    let bytes = take::<8>(data, offset)?;
    Ok((u64::from_le_bytes(bytes), offset + 8))
}

/// Append `value` as four little-endian bytes.
pub fn encode_fixed32(value: u32, buf: &mut impl BufMut) {
    buf.put_u32_le(value);
}

/// Append `value` as eight little-endian bytes.
pub fn encode_fixed64(value: u64, buf: &mut impl BufMut) {
    buf.put_u64_le(value);
}

fn take<const N: usize>(data: &[u8], offset: usize) -> Result<[u8; N]> {
    data.get(offset..)
        .and_then(|rest| rest.get(..N))
        .and_then(|slice| slice.try_into().ok())
        .ok_or_else(|| Error::buffer_underflow(offset))
}
