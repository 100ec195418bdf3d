//! Error types for the rawproto-core library.
//!
//! Every failure aborts the whole decode or encode call. Variants carry the
//! byte offset (where one applies) so malformed input can be diagnosed.

use thiserror::Error;

/// Result type alias for rawproto operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all wire-format operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Malformed hex string, unencodable value or malformed record
    #[error("invalid argument: {details}")]
    InvalidArgument {
        /// Description of what was wrong with the input
        details: String,
    },

    /// Input ended before a varint terminated or a fixed-width value was complete
    #[error("buffer underflow at offset {offset}")]
    BufferUnderflow {
        /// Offset where the truncated value started
        offset: usize,
    },

    /// Varint did not terminate within the 64-bit budget
    #[error("varint too long at offset {offset}")]
    VarintTooLong {
        /// Offset where the varint started
        offset: usize,
    },

    /// A LEN payload or fixed-width field would read past the end of the buffer
    #[error("{wire} overflow at offset {offset}: need {needed} bytes, have {available}")]
    BufferOverflow {
        /// Offset where the value bytes start
        offset: usize,
        /// Name of the wire type being read
        wire: &'static str,
        /// Number of bytes the field requires
        needed: u64,
        /// Number of bytes left in the buffer
        available: usize,
    },

    /// A tag carried a field number outside `1..=MAX_FIELD_NUMBER`
    #[error("invalid field {number} at offset {offset}")]
    InvalidField {
        /// The offending field number
        number: u64,
        /// Offset of the tag
        offset: usize,
    },

    /// Wire type 3, 4 or anything above 5
    #[error("unsupported wire type {wire_type} at offset {offset}")]
    UnsupportedWireType {
        /// The raw wire type value
        wire_type: u64,
        /// Offset of the tag
        offset: usize,
    },
}

impl Error {
    /// Creates a new invalid argument error
    pub fn invalid_argument(details: impl Into<String>) -> Self {
        Self::InvalidArgument {
            details: details.into(),
        }
    }

    /// Creates a new buffer underflow error
    pub fn buffer_underflow(offset: usize) -> Self {
        Self::BufferUnderflow { offset }
    }

    /// Creates a new varint length error
    pub fn varint_too_long(offset: usize) -> Self {
        Self::VarintTooLong { offset }
    }

    /// Creates a new buffer overflow error
    pub fn buffer_overflow(offset: usize, wire: &'static str, needed: u64, available: usize) -> Self {
        Self::BufferOverflow {
            offset,
            wire,
            needed,
            available,
        }
    }

    /// Creates a new invalid field error
    pub fn invalid_field(number: u64, offset: usize) -> Self {
        Self::InvalidField { number, offset }
    }

    /// Creates a new unsupported wire type error
    pub fn unsupported_wire_type(wire_type: u64, offset: usize) -> Self {
        Self::UnsupportedWireType { wire_type, offset }
    }

    /// Returns the byte offset the error refers to, if any
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::InvalidArgument { .. } => None,
            Self::BufferUnderflow { offset }
            | Self::VarintTooLong { offset }
            | Self::BufferOverflow { offset, .. }
            | Self::InvalidField { offset, .. }
            | Self::UnsupportedWireType { offset, .. } => Some(*offset),
        }
    }
}
