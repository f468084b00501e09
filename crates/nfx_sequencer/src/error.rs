//! Error types for the sequencer.

use nfx_format::FormatError;
use thiserror::Error;

/// Result type for sequencer operations.
pub type SequencerResult<T> = Result<T, SequencerError>;

/// Errors that can occur while compiling a plan or projecting a record.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SequencerError {
    /// The sequence entry list is empty or self-inconsistent.
    ///
    /// Fatal to the plan; retrying with the same entries fails again.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the problem.
        message: String,
    },

    /// The input record is inconsistent with its own header.
    ///
    /// The record should be skipped; the plan remains usable.
    #[error("malformed record: {message}")]
    MalformedRecord {
        /// Description of the inconsistency.
        message: String,
    },

    /// The output buffer cannot hold the projected record.
    #[error("output buffer too small: need {required} bytes, have {available}")]
    BufferTooSmall {
        /// Bytes the projection needs.
        required: usize,
        /// Bytes the caller provided.
        available: usize,
    },
}

impl SequencerError {
    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a malformed record error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRecord {
            message: message.into(),
        }
    }

    /// Returns true if the error only concerns the current record.
    ///
    /// Callers skip the record (or resize the buffer) and continue with the
    /// same plan.
    #[must_use]
    pub fn is_record_local(&self) -> bool {
        matches!(
            self,
            Self::MalformedRecord { .. } | Self::BufferTooSmall { .. }
        )
    }

    /// Wraps a reader error raised while scanning an input record.
    pub(crate) fn from_scan(error: FormatError) -> Self {
        Self::malformed(error.to_string())
    }
}
