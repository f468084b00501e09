//! Error types for the format crate.

use thiserror::Error;

/// Result type for record format operations.
pub type FormatResult<T> = Result<T, FormatError>;

/// Errors that can occur while building, reading, or describing records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The extension id is not present in the catalog.
    #[error("unknown extension id {id}")]
    UnknownExtension {
        /// The offending extension id.
        id: u16,
    },

    /// A fixed-size extension payload does not match the catalog size.
    #[error("payload size mismatch for extension {id}: expected {expected} bytes, got {actual}")]
    PayloadSizeMismatch {
        /// Extension id.
        id: u16,
        /// Size declared by the catalog.
        expected: usize,
        /// Size of the supplied payload.
        actual: usize,
    },

    /// The record would not fit the 16-bit size field.
    #[error("record too large: {size} bytes exceeds maximum of {max} bytes")]
    RecordTooLarge {
        /// Size the record would have.
        size: usize,
        /// Maximum encodable record size.
        max: usize,
    },

    /// Input ended before a complete header could be read.
    #[error("truncated input at offset {offset}: need {needed} bytes, {available} available")]
    Truncated {
        /// Offset at which the read was attempted.
        offset: usize,
        /// Number of bytes required.
        needed: usize,
        /// Number of bytes remaining.
        available: usize,
    },

    /// An element header declares an impossible length.
    #[error("invalid element length {length} for extension {id} at offset {offset}")]
    InvalidElementLength {
        /// Extension id from the element header.
        id: u16,
        /// Declared length.
        length: u16,
        /// Offset of the element header within the record.
        offset: usize,
    },

    /// The record header is inconsistent with the buffer.
    #[error("invalid record header: {message}")]
    InvalidHeader {
        /// Description of the inconsistency.
        message: String,
    },

    /// A caller-defined catalog entry is not acceptable.
    #[error("invalid catalog entry: {message}")]
    InvalidCatalog {
        /// Description of the problem.
        message: String,
    },
}

impl FormatError {
    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// Create an invalid catalog error.
    pub fn invalid_catalog(message: impl Into<String>) -> Self {
        Self::InvalidCatalog {
            message: message.into(),
        }
    }
}
