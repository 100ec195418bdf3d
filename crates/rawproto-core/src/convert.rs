//! Hex string conversion for inputs and outputs.

use crate::error::{Error, Result};

/// Convert a hex string to bytes.
///
/// An optional `0x`/`0X` prefix is stripped. Upper and lower case digits are
/// accepted; an empty string yields no bytes.
///
/// # Errors
///
/// [`Error::InvalidArgument`] on odd length or non-hex characters.
pub fn hex_to_bytes(input: &str) -> Result<Vec<u8>> {
    let digits = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input);

    if digits.len() % 2 != 0 {
        return Err(Error::invalid_argument(format!(
            "invalid hex string '{}': odd number of digits",
            digits
        )));
    }

    hex::decode(digits)
        .map_err(|e| Error::invalid_argument(format!("invalid hex string '{}': {}", digits, e)))
}

/// Render bytes as a lowercase hex string.
pub fn bytes_to_hex(data: impl AsRef<[u8]>) -> String {
    hex::encode(data)
}

/// Whether `text` consists only of hex digits and has even length.
///
/// This is the test the encoder uses to decide that a LEN string holds hex
/// rather than text.
pub fn is_even_hex(text: &str) -> bool {
    text.len() % 2 == 0 && text.bytes().all(|b| b.is_ascii_hexdigit())
}
