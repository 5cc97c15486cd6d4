//! respwire - response frame codec for a length-prefixed RPC exchange protocol
//!
//! A response frame is a 16-byte big-endian header followed by a body of
//! self-describing values. This crate builds and parses those frames and
//! copies decoded results into strongly typed destinations.
//!
//! # Quick Start
//!
//! ```rust
//! use respwire::{Outcome, ResponseCodec, ResponseHeader, Value, HEADER_LENGTH};
//! use respwire::serialize::{Serialization, Tlv};
//!
//! let codec = ResponseCodec::new();
//!
//! // Build a response carrying a list of ints
//! let header = ResponseHeader::response(Tlv::ID, 42);
//! let outcome = Outcome::from_value(Value::List(vec![Value::Int(1), Value::Int(2)]));
//! let frame = codec.build(&header, &outcome)?;
//!
//! // Parse it back into a typed destination
//! let mut reply: Outcome<Vec<i32>> = Outcome::default();
//! codec.parse(&frame[HEADER_LENGTH..], &mut reply)?;
//! assert_eq!(reply.value, Some(vec![1, 2]));
//! # Ok::<(), respwire::Error>(())
//! ```
//!
//! # Features
//!
//! - **Attachment negotiation** - trailing attachments only for peers that understand them
//! - **Typed coercion** - element-wise checked copies into `Vec`, arrays and maps
//! - **Pluggable bodies** - any [`serialize::Serialization`], with [`serialize::Tlv`] bundled
//! - **Optional serde** - `serde` feature for the value model and config

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod protocol;
pub mod serialize;
pub mod value;

pub use protocol::{
    Attachments, CodecConfig, DEFAULT_MAX_FRAME_SIZE, Error, HEADER_LENGTH, Outcome, PackageKind,
    ResponseCodec, ResponseHeader, Result, Status,
};
pub use value::{Coerce, Throwable, Value, coerce};
