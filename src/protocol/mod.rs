//! Response frame protocol
//!
//! This module provides the wire header, body discriminators, version
//! negotiation and the codec that ties them together.

mod codec;
mod config;
mod error;
mod header;
mod metrics;
mod outcome;
mod types;
mod version;

pub use codec::ResponseCodec;
pub use config::CodecConfig;
pub use error::{Error, Result};
pub use header::ResponseHeader;
pub use metrics::{MetricsSnapshot, snapshot};
pub use outcome::{Attachments, Outcome, RemoteError};
pub use types::{
    BodyKind, FLAG_EVENT, FLAG_REQUEST, FLAG_TWO_WAY, PackageKind, ResponseTag, SERIAL_MASK,
    Status,
};
pub use version::{LOWEST_VERSION_FOR_RESPONSE_ATTACHMENT, VersionCache, parse_version};

/// High byte of the frame magic
pub const MAGIC_HIGH: u8 = 0xDA;

/// Low byte of the frame magic
pub const MAGIC_LOW: u8 = 0xBB;

/// Header size in bytes
pub const HEADER_LENGTH: usize = 16;

/// Default maximum frame size (8 MiB)
pub const DEFAULT_MAX_FRAME_SIZE: usize = 8 * 1024 * 1024;

/// Attachment key carrying the peer's protocol version
pub const VERSION_KEY: &str = "dubbo";
