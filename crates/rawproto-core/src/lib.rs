//! # rawproto-core
//!
//! A library for decoding and re-encoding Protocol Buffers wire-format
//! messages without a schema.
//!
//! This crate provides the core functionality for:
//! - Splitting a payload into ordered `(field, wire type, value)` records
//! - Rebuilding a payload from such records
//! - Converting between hex strings and bytes
//! - Rendering decoded records as JSON
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`varint`]: LEB128 varint coding
//! - [`fixed`]: fixed-width little-endian values
//! - [`wire`]: the record data model
//! - [`decode`]: wire-format parser
//! - [`encode`]: wire-format serializer
//! - [`convert`]: hex string conversion
//! - [`json`]: JSON record and display forms
//! - [`error`]: Error types and handling
//!
//! ## Example
//!
//! ```
//! use rawproto_core::{decode_hex, encode_hex, Field};
//!
//! let fields = decode_hex("089601120774657374696e67")?;
//! assert_eq!(fields, vec![Field::varint(1, 150), Field::text(2, "testing")]);
//!
//! assert_eq!(encode_hex(&fields)?, "089601120774657374696e67");
//! # Ok::<(), rawproto_core::Error>(())
//! ```
//!
//! ## LEN payloads
//!
//! LEN payloads are never decoded as nested messages. They are kept as text
//! when they are valid UTF-8 and as lowercase hex otherwise, and on encode
//! any even-length hex-digit string is turned back into bytes. That makes
//! re-encoding best-effort: see [`encode::len_payload`].
//!
//! All functions are pure and hold no state, so they can be called from any
//! number of threads at once.

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod convert;
pub mod decode;
pub mod encode;
pub mod error;
pub mod fixed;
pub mod json;
pub mod varint;
pub mod wire;

// Re-export primary types for convenience
pub use convert::{bytes_to_hex, hex_to_bytes};
pub use decode::{decode, decode_hex};
pub use encode::{encode, encode_hex};
pub use error::{Error, Result};
pub use varint::{decode_varint, encode_varint};
pub use wire::{Field, FieldValue, LenValue, WireType};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum valid protobuf field number (2^29 - 1)
pub const MAX_FIELD_NUMBER: u32 = 536_870_911;
