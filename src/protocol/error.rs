//! Response codec error types

use thiserror::Error;

use crate::serialize::SerializeError;

/// Local failures raised while building or parsing a response frame.
///
/// Remote exceptions carried inside a frame are never represented here; they
/// travel in [`Outcome::exception`](super::Outcome).
#[derive(Error, Debug)]
pub enum Error {
    /// The body could not be decoded
    #[error("failed to decode {context}: {source}")]
    Decode {
        /// Field being decoded when the failure happened
        context: &'static str,
        /// Underlying serialization failure
        source: SerializeError,
    },

    /// A body value could not be encoded
    #[error("failed to encode {context}: {source}")]
    Encode {
        /// Field being encoded when the failure happened
        context: &'static str,
        /// Underlying serialization failure
        source: SerializeError,
    },

    /// Built frame exceeds the configured maximum
    #[error("data length {size} too large, max payload {max}")]
    OversizeFrame {
        /// Total frame size in bytes
        size: usize,
        /// Maximum allowed
        max: usize,
    },

    /// Decoded value cannot be assigned to the destination type
    #[error("{found} can not assign to {expected} at {location}")]
    TypeMismatch {
        /// Destination type
        expected: String,
        /// Runtime type of the decoded value
        found: String,
        /// Where in the destination the mismatch happened
        location: String,
    },

    /// Attachments were not a string to string mapping
    #[error("get wrong attachments: {found}")]
    InvalidAttachments {
        /// Description of what was decoded instead
        found: String,
    },

    /// A required input was absent
    #[error("{what} is nil")]
    NilInput {
        /// Name of the missing input
        what: &'static str,
    },

    /// Frame does not start with the protocol magic
    #[error("invalid magic number: expected 0xdabb, got {found:#06x}")]
    InvalidMagic {
        /// Found magic number
        found: u16,
    },

    /// Buffer too small
    #[error("buffer too small: need {needed} bytes, got {got}")]
    BufferTooSmall {
        /// Needed size
        needed: usize,
        /// Actual size
        got: usize,
    },
}

impl Error {
    pub(crate) fn type_mismatch(
        expected: impl Into<String>,
        found: impl ToString,
        location: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.to_string(),
            location: location.into(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
