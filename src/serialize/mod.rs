//! Body serialization seam
//!
//! The response codec only frames values; turning a [`Value`] into bytes is
//! delegated to a [`Serialization`]. [`Tlv`] is the bundled format.

mod tlv;

use bytes::BytesMut;
use thiserror::Error;

use crate::value::Value;

pub use tlv::{Tlv, TlvDecoder, TlvEncoder};

/// Serialization failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SerializeError {
    /// Input ended in the middle of a value
    #[error("unexpected end of input: need {needed} bytes, {remaining} remaining")]
    UnexpectedEnd {
        /// Bytes required by the current value
        needed: usize,
        /// Bytes left in the input
        remaining: usize,
    },

    /// Byte is not a known value tag
    #[error("invalid tag byte {tag:#04x} at offset {offset}")]
    InvalidTag {
        /// Offending byte
        tag: u8,
        /// Offset of the byte in the input
        offset: usize,
    },

    /// String payload is not UTF-8
    #[error("invalid UTF-8 in string at offset {offset}")]
    InvalidUtf8 {
        /// Offset of the string payload
        offset: usize,
    },

    /// Blob or container is longer than the format can express
    #[error("value too large to encode: {0} elements")]
    TooLarge(usize),

    /// Value nesting is deeper than the format allows
    #[error("nesting depth exceeds {0}")]
    DepthExceeded(usize),
}

/// Appends values to a growing body buffer.
pub trait Encoder {
    /// Append raw bytes that are not values (the frame header).
    fn append(&mut self, raw: &[u8]);

    /// Append one value.
    fn encode(&mut self, value: &Value) -> Result<(), SerializeError>;

    /// Append the format's end-of-body marker and hand back the buffer.
    fn finish(self) -> BytesMut;
}

/// Reads values from a body, one per call.
pub trait Decoder {
    /// Decode the next value and advance past it.
    fn decode(&mut self) -> Result<Value, SerializeError>;

    /// Current read offset
    fn position(&self) -> usize;
}

/// A body encoding identified on the wire by a serialization id.
pub trait Serialization {
    /// Serialization id carried in the low 5 bits of header byte 2
    const ID: u8;

    /// Encoder type
    type Encoder: Encoder;

    /// Decoder type, borrowing the body
    type Decoder<'a>: Decoder;

    /// Start a new body with room for `capacity` bytes.
    fn encoder(capacity: usize) -> Self::Encoder;

    /// Start reading a body.
    fn decoder(body: &[u8]) -> Self::Decoder<'_>;
}
