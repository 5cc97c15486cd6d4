//! Header kinds, response status and body discriminators

use std::fmt;

/// Which header template a frame uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PackageKind {
    /// Request echoed back; framed like a normal response
    Request,
    /// Normal response
    #[default]
    Response,
    /// Heartbeat reply
    Heartbeat,
}

impl PackageKind {
    /// Kind implied by header flag bits
    #[must_use]
    pub const fn from_flags(flags: u8) -> Self {
        if flags & FLAG_EVENT != 0 {
            Self::Heartbeat
        } else if flags & FLAG_REQUEST != 0 {
            Self::Request
        } else {
            Self::Response
        }
    }

    /// Check if this is a heartbeat
    #[must_use]
    pub const fn is_heartbeat(self) -> bool {
        matches!(self, Self::Heartbeat)
    }
}

impl fmt::Display for PackageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Request => "Request",
            Self::Response => "Response",
            Self::Heartbeat => "Heartbeat",
        };
        write!(f, "{name}")
    }
}

/// Request flag bit
pub const FLAG_REQUEST: u8 = 0x80;
/// Two-way (response expected) flag bit
pub const FLAG_TWO_WAY: u8 = 0x40;
/// Event (heartbeat) flag bit
pub const FLAG_EVENT: u8 = 0x20;
/// Serialization id bits
pub const SERIAL_MASK: u8 = 0x1F;

/// Response status byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Status(u8);

impl Status {
    /// Not yet determined; leaves the template byte in place.
    ///
    /// The body is still built as a non-OK body, so an unset response frame
    /// reads back as OK with an untagged body and does not parse.
    pub const UNSET: Self = Self(0);
    /// Success
    pub const OK: Self = Self(20);
    /// Client side timed out
    pub const CLIENT_TIMEOUT: Self = Self(30);
    /// Server side timed out
    pub const SERVER_TIMEOUT: Self = Self(31);
    /// Request could not be decoded
    pub const BAD_REQUEST: Self = Self(40);
    /// Response could not be encoded
    pub const BAD_RESPONSE: Self = Self(50);
    /// Service not found
    pub const SERVICE_NOT_FOUND: Self = Self(60);
    /// Service raised an error
    pub const SERVICE_ERROR: Self = Self(70);
    /// Server side failure
    pub const SERVER_ERROR: Self = Self(80);
    /// Client side failure
    pub const CLIENT_ERROR: Self = Self(90);
    /// Server worker pool exhausted
    pub const SERVER_THREADPOOL_EXHAUSTED: Self = Self(100);

    /// Create from byte
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        Self(value)
    }

    /// Convert to byte
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self.0
    }

    /// Check if status is OK
    #[must_use]
    pub const fn is_ok(self) -> bool {
        self.0 == Self::OK.0
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            Self::UNSET => "UNSET",
            Self::OK => "OK",
            Self::CLIENT_TIMEOUT => "CLIENT_TIMEOUT",
            Self::SERVER_TIMEOUT => "SERVER_TIMEOUT",
            Self::BAD_REQUEST => "BAD_REQUEST",
            Self::BAD_RESPONSE => "BAD_RESPONSE",
            Self::SERVICE_NOT_FOUND => "SERVICE_NOT_FOUND",
            Self::SERVICE_ERROR => "SERVICE_ERROR",
            Self::SERVER_ERROR => "SERVER_ERROR",
            Self::CLIENT_ERROR => "CLIENT_ERROR",
            Self::SERVER_THREADPOOL_EXHAUSTED => "SERVER_THREADPOOL_EXHAUSTED",
            Self(other) => return write!(f, "STATUS({other})"),
        };
        write!(f, "{name}")
    }
}

/// Shape of an OK-status response body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyKind {
    /// Exception follows
    Exception,
    /// Result value follows
    Value,
    /// No result
    Null,
}

/// Body discriminator of an OK-status response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ResponseTag {
    /// Exception
    WithException = 0,
    /// Value
    Value = 1,
    /// Null value
    NullValue = 2,
    /// Exception, then attachments
    WithExceptionWithAttachments = 3,
    /// Value, then attachments
    ValueWithAttachments = 4,
    /// Null value, then attachments
    NullValueWithAttachments = 5,
}

impl ResponseTag {
    /// Convert from a decoded discriminator
    #[must_use]
    pub const fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::WithException),
            1 => Some(Self::Value),
            2 => Some(Self::NullValue),
            3 => Some(Self::WithExceptionWithAttachments),
            4 => Some(Self::ValueWithAttachments),
            5 => Some(Self::NullValueWithAttachments),
            _ => None,
        }
    }

    /// Tag for a body shape, with or without trailing attachments
    #[must_use]
    pub const fn new(kind: BodyKind, attachments: bool) -> Self {
        match (kind, attachments) {
            (BodyKind::Exception, false) => Self::WithException,
            (BodyKind::Value, false) => Self::Value,
            (BodyKind::Null, false) => Self::NullValue,
            (BodyKind::Exception, true) => Self::WithExceptionWithAttachments,
            (BodyKind::Value, true) => Self::ValueWithAttachments,
            (BodyKind::Null, true) => Self::NullValueWithAttachments,
        }
    }

    /// Convert to the wire discriminator
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Body shape selected by this tag
    #[must_use]
    pub const fn kind(self) -> BodyKind {
        match self {
            Self::WithException | Self::WithExceptionWithAttachments => BodyKind::Exception,
            Self::Value | Self::ValueWithAttachments => BodyKind::Value,
            Self::NullValue | Self::NullValueWithAttachments => BodyKind::Null,
        }
    }

    /// Check if attachments follow the payload
    #[must_use]
    pub const fn has_attachments(self) -> bool {
        matches!(
            self,
            Self::WithExceptionWithAttachments
                | Self::ValueWithAttachments
                | Self::NullValueWithAttachments
        )
    }
}
