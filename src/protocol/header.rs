//! Response frame header
//!
//! The header is 16 bytes, big-endian.

use super::types::{FLAG_EVENT, SERIAL_MASK};
use super::{Error, HEADER_LENGTH, MAGIC_HIGH, MAGIC_LOW, PackageKind, Result, Status};

/// Template for normal responses: OK status unless overridden.
const RESPONSE_TEMPLATE: [u8; 4] = [MAGIC_HIGH, MAGIC_LOW, 0, Status::OK.as_u8()];

/// Template for heartbeat replies.
const HEARTBEAT_TEMPLATE: [u8; 4] = [MAGIC_HIGH, MAGIC_LOW, FLAG_EVENT, 0];

/// Response frame header (16 bytes)
///
/// # Wire Format
///
/// ```text
/// 0               1               2               3
/// 0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |          Magic 0xDABB         |R|2|E| Serial  |    Status     |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// +                    Correlation ID (8)                         +
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                        Body Length (4)                        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResponseHeader {
    kind: PackageKind,
    serialization_id: u8,
    status: Status,
    correlation_id: i64,
    body_len: u32,
}

impl ResponseHeader {
    /// Create a header with OK status
    #[must_use]
    pub fn new(kind: PackageKind, serialization_id: u8, correlation_id: i64) -> Self {
        Self {
            kind,
            serialization_id: serialization_id & SERIAL_MASK,
            status: Status::OK,
            correlation_id,
            body_len: 0,
        }
    }

    /// Create a normal response header
    #[must_use]
    pub fn response(serialization_id: u8, correlation_id: i64) -> Self {
        Self::new(PackageKind::Response, serialization_id, correlation_id)
    }

    /// Create a heartbeat reply header
    #[must_use]
    pub fn heartbeat(serialization_id: u8, correlation_id: i64) -> Self {
        Self::new(PackageKind::Heartbeat, serialization_id, correlation_id)
    }

    /// Replace the status
    #[must_use]
    pub const fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    /// Get kind
    #[must_use]
    pub const fn kind(&self) -> PackageKind {
        self.kind
    }

    /// Get serialization id
    #[must_use]
    pub const fn serialization_id(&self) -> u8 {
        self.serialization_id
    }

    /// Get status
    #[must_use]
    pub const fn status(&self) -> Status {
        self.status
    }

    /// Get correlation ID
    #[must_use]
    pub const fn correlation_id(&self) -> i64 {
        self.correlation_id
    }

    /// Get body length (zero until a frame is built or parsed)
    #[must_use]
    pub const fn body_len(&self) -> u32 {
        self.body_len
    }

    /// Convert to bytes (big-endian)
    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_LENGTH] {
        let mut bytes = [0u8; HEADER_LENGTH];

        let template = if self.kind.is_heartbeat() {
            HEARTBEAT_TEMPLATE
        } else {
            RESPONSE_TEMPLATE
        };
        bytes[0..4].copy_from_slice(&template);
        bytes[2] |= self.serialization_id & SERIAL_MASK;
        if self.status != Status::UNSET {
            bytes[3] = self.status.as_u8();
        }
        bytes[4..12].copy_from_slice(&self.correlation_id.to_be_bytes());
        bytes[12..16].copy_from_slice(&self.body_len.to_be_bytes());

        bytes
    }

    /// Parse from bytes (big-endian)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let Some(bytes) = bytes.first_chunk::<HEADER_LENGTH>() else {
            return Err(Error::BufferTooSmall {
                needed: HEADER_LENGTH,
                got: bytes.len(),
            });
        };

        let magic = u16::from_be_bytes([bytes[0], bytes[1]]);
        if magic != u16::from_be_bytes([MAGIC_HIGH, MAGIC_LOW]) {
            return Err(Error::InvalidMagic { found: magic });
        }

        let mut id = [0u8; 8];
        id.copy_from_slice(&bytes[4..12]);
        let mut len = [0u8; 4];
        len.copy_from_slice(&bytes[12..16]);

        Ok(Self {
            kind: PackageKind::from_flags(bytes[2]),
            serialization_id: bytes[2] & SERIAL_MASK,
            status: Status::from_u8(bytes[3]),
            correlation_id: i64::from_be_bytes(id),
            body_len: u32::from_be_bytes(len),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        let header = ResponseHeader::response(2, 0x0102_0304_0506_0708);
        let bytes = header.to_bytes();

        assert_eq!(bytes[0..2], [0xDA, 0xBB]);
        assert_eq!(bytes[2], 0x02);
        assert_eq!(bytes[3], 20);
        assert_eq!(bytes[4..12], [1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(bytes[12..16], [0, 0, 0, 0]);
    }

    #[test]
    fn test_unset_status_keeps_template() {
        let response = ResponseHeader::response(2, 1).with_status(Status::UNSET);
        assert_eq!(response.to_bytes()[3], Status::OK.as_u8());

        let heartbeat = ResponseHeader::heartbeat(2, 1).with_status(Status::UNSET);
        assert_eq!(heartbeat.to_bytes()[3], 0);
    }

    #[test]
    fn test_serialization_id_masked() {
        let header = ResponseHeader::heartbeat(0xFF, -1);
        let bytes = header.to_bytes();
        assert_eq!(bytes[2], FLAG_EVENT | SERIAL_MASK);
        assert_eq!(bytes[4..12], [0xFF; 8]);
    }

    #[test]
    fn test_header_roundtrip() {
        let header = ResponseHeader::heartbeat(6, -42).with_status(Status::SERVER_TIMEOUT);
        let decoded = ResponseHeader::from_bytes(&header.to_bytes()).unwrap();
        assert_eq!(decoded, header);
    }

    #[test]
    fn test_invalid_magic() {
        let mut bytes = ResponseHeader::response(2, 1).to_bytes();
        bytes[0] = 0xDE;
        assert!(matches!(
            ResponseHeader::from_bytes(&bytes),
            Err(Error::InvalidMagic { found: 0xDEBB })
        ));
    }

    #[test]
    fn test_short_buffer() {
        assert!(matches!(
            ResponseHeader::from_bytes(&[0xDA, 0xBB]),
            Err(Error::BufferTooSmall { needed: 16, got: 2 })
        ));
    }
}
