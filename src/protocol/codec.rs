//! Response frame codec (build/parse)
//!
//! # Format
//!
//! ```text
//! [HEADER (16 bytes)] [BODY (variable)]
//! ```
//!
//! An OK-status body starts with an `Int` discriminator ([`ResponseTag`])
//! followed by the exception or value, then attachments when the tag says
//! so. Bodies of other statuses carry a single untagged value: the error
//! message, or the raw result. Heartbeat replies carry a lone null.

use std::error::Error as StdError;
use std::marker::PhantomData;

use bytes::{Bytes, BytesMut};
use tracing::{debug, instrument, trace};

use super::metrics::{FrameBody, Metrics};
use super::types::{BodyKind, ResponseTag};
use super::{
    Attachments, CodecConfig, Error, HEADER_LENGTH, Outcome, RemoteError, ResponseHeader, Result,
    VersionCache,
};
use crate::serialize::{Decoder, Encoder, Serialization, Tlv};
use crate::value::{Coerce, Throwable, Value, coerce};

/// Builds and parses response frames for one body serialization.
///
/// The codec owns the version cache used for attachment negotiation, so a
/// single instance should be shared (by reference or `Arc`) across every
/// connection talking the same protocol.
#[derive(Debug)]
pub struct ResponseCodec<S = Tlv> {
    config: CodecConfig,
    versions: VersionCache,
    _format: PhantomData<fn() -> S>,
}

impl ResponseCodec {
    /// Create a codec using the bundled serialization and default config
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(CodecConfig::default())
    }

    /// Create a codec using the bundled serialization
    #[must_use]
    pub fn with_config(config: CodecConfig) -> Self {
        Self::for_format(config)
    }
}

impl Default for ResponseCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Serialization> ResponseCodec<S> {
    /// Create a codec for an explicit serialization
    #[must_use]
    pub fn for_format(config: CodecConfig) -> Self {
        Self {
            config,
            versions: VersionCache::new(),
            _format: PhantomData,
        }
    }

    /// Get config
    #[must_use]
    pub const fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Get version cache
    #[must_use]
    pub const fn versions(&self) -> &VersionCache {
        &self.versions
    }

    /// Encode a response frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] if a body value cannot be serialized and
    /// [`Error::OversizeFrame`] if the frame exceeds the configured maximum.
    /// No bytes are returned on failure.
    ///
    /// A [`Status::UNSET`](super::Status::UNSET) response keeps the OK status
    /// byte from the template but gets an untagged body, so [`parse_frame`]
    /// cannot read it back. Set the status before building.
    ///
    /// [`parse_frame`]: Self::parse_frame
    #[instrument(
        level = "trace",
        skip_all,
        fields(correlation_id = header.correlation_id(), status = %header.status())
    )]
    pub fn build(&self, header: &ResponseHeader, outcome: &Outcome) -> Result<Bytes> {
        let (mut buf, body) = self.encode_frame(header, outcome).inspect_err(|err| {
            debug!(error = %err, "failed to encode response");
            Metrics::record_error();
        })?;

        let size = buf.len();
        let max = self.config.max_frame_size;
        if size > max {
            debug!(size, max, "response frame too large");
            Metrics::record_oversize();
            return Err(Error::OversizeFrame { size, max });
        }

        let body_len = u32::try_from(size - HEADER_LENGTH).map_err(|_| {
            Metrics::record_oversize();
            Error::OversizeFrame {
                size,
                max: HEADER_LENGTH + u32::MAX as usize,
            }
        })?;
        buf[12..16].copy_from_slice(&body_len.to_be_bytes());

        trace!(len = size, "built response frame");
        Metrics::record_built(body, size);
        Ok(buf.freeze())
    }

    /// Decode a response body into `destination`.
    ///
    /// `body` starts right after the 16-byte header of an OK-status,
    /// non-heartbeat frame. The decoded value is coerced into
    /// `destination.value`; unknown discriminators are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] for malformed bodies,
    /// [`Error::InvalidAttachments`] when attachments are not a string map,
    /// and coercion errors from [`coerce`].
    #[instrument(level = "trace", skip_all, fields(len = body.len()))]
    pub fn parse<T: Coerce>(&self, body: &[u8], destination: &mut Outcome<T>) -> Result<()> {
        parse_tagged_body::<S, T>(body, destination).inspect_err(|err| {
            debug!(error = %err, "failed to parse response body");
            Metrics::record_error();
        })
    }

    /// Decode a complete frame: header, then body according to its status.
    ///
    /// Heartbeat bodies are skipped. Non-OK bodies are untagged; their
    /// message is stored as `destination.exception`.
    pub fn parse_frame<T: Coerce>(
        &self,
        frame: &[u8],
        destination: &mut Outcome<T>,
    ) -> Result<ResponseHeader> {
        let header = ResponseHeader::from_bytes(frame)?;
        let end = HEADER_LENGTH + header.body_len() as usize;
        let body = frame.get(HEADER_LENGTH..end).ok_or(Error::BufferTooSmall {
            needed: end,
            got: frame.len(),
        })?;

        if header.kind().is_heartbeat() {
            trace!(correlation_id = header.correlation_id(), "heartbeat reply");
        } else if header.status().is_ok() {
            self.parse(body, destination)?;
        } else {
            let raw = decode_field(&mut S::decoder(body), "error body")?;
            destination.exception = Some(match raw {
                Value::String(message) => message.into(),
                Value::Null => format!("response status {}", header.status()).into(),
                other => remote_error(other),
            });
        }
        Ok(header)
    }

    fn encode_frame(
        &self,
        header: &ResponseHeader,
        outcome: &Outcome,
    ) -> Result<(BytesMut, FrameBody)> {
        let mut encoder = S::encoder(HEADER_LENGTH + 64);
        encoder.append(&header.to_bytes());

        let body = if !header.status().is_ok() {
            match outcome.exception.as_deref() {
                Some(exception) => encode_field(
                    &mut encoder,
                    &Value::String(error_message(exception)),
                    "error message",
                )?,
                None => encode_field(
                    &mut encoder,
                    outcome.value.as_ref().unwrap_or(&Value::Null),
                    "result value",
                )?,
            }
            FrameBody::Untagged
        } else if header.kind().is_heartbeat() {
            encode_field(&mut encoder, &Value::Null, "heartbeat")?;
            FrameBody::Heartbeat
        } else {
            let version = outcome
                .attachments
                .get(&self.config.version_key)
                .map_or("", String::as_str);
            let attachments = self.versions.supports_attachments(version);

            let kind = encode_payload(&mut encoder, outcome, attachments)?;
            if attachments {
                encode_field(
                    &mut encoder,
                    &Value::string_map(&outcome.attachments),
                    "attachments",
                )?;
            }
            FrameBody::Tagged { kind, attachments }
        };

        Ok((encoder.finish(), body))
    }
}

fn encode_payload<E: Encoder>(
    encoder: &mut E,
    outcome: &Outcome,
    attachments: bool,
) -> Result<BodyKind> {
    let payload = outcome.value.as_ref().filter(|v| !v.is_null());
    let kind = match (&outcome.exception, payload) {
        (Some(_), _) => BodyKind::Exception,
        (None, Some(_)) => BodyKind::Value,
        (None, None) => BodyKind::Null,
    };

    let tag = ResponseTag::new(kind, attachments);
    trace!(?tag, "encoding response body");
    encode_field(encoder, &Value::Int(tag.as_i32()), "response discriminator")?;

    if let Some(exception) = outcome.exception.as_deref() {
        encode_field(encoder, &Value::Throwable(to_throwable(exception)), "exception")?;
    } else if let Some(value) = payload {
        encode_field(encoder, value, "result value")?;
    }
    Ok(kind)
}

fn parse_tagged_body<S: Serialization, T: Coerce>(
    body: &[u8],
    destination: &mut Outcome<T>,
) -> Result<()> {
    let mut decoder = S::decoder(body);
    let discriminator = decode_field(&mut decoder, "response discriminator")?;

    let Some(tag) = discriminator.as_int().and_then(ResponseTag::from_i32) else {
        debug!(%discriminator, "ignoring unknown response discriminator");
        Metrics::record_parsed(None);
        return Ok(());
    };
    trace!(?tag, "parsing response body");

    match tag.kind() {
        BodyKind::Exception => {
            let raw = decode_field(&mut decoder, "exception")?;
            if tag.has_attachments() {
                destination.attachments = read_attachments(&mut decoder)?;
            }
            destination.exception = Some(remote_error(raw));
        }
        BodyKind::Value => {
            let raw = decode_field(&mut decoder, "result value")?;
            if tag.has_attachments() {
                destination.attachments = read_attachments(&mut decoder)?;
            }
            coerce(raw, &mut destination.value)?;
        }
        BodyKind::Null => {
            if tag.has_attachments() {
                destination.attachments = read_attachments(&mut decoder)?;
            }
        }
    }

    Metrics::record_parsed(Some(tag.kind()));
    Ok(())
}

fn encode_field<E: Encoder>(encoder: &mut E, value: &Value, context: &'static str) -> Result<()> {
    encoder
        .encode(value)
        .map_err(|source| Error::Encode { context, source })
}

fn decode_field<D: Decoder>(decoder: &mut D, context: &'static str) -> Result<Value> {
    decoder
        .decode()
        .map_err(|source| Error::Decode { context, source })
}

fn read_attachments<D: Decoder>(decoder: &mut D) -> Result<Attachments> {
    match decode_field(decoder, "attachments")? {
        Value::Map(pairs) => pairs
            .into_iter()
            .map(|pair| match pair {
                (Value::String(key), Value::String(value)) => Ok((key, value)),
                (key, value) => Err(Error::InvalidAttachments {
                    found: format!("entry {key}: {value}"),
                }),
            })
            .collect(),
        other => Err(Error::InvalidAttachments {
            found: other.value_type().to_string(),
        }),
    }
}

/// Pass a `Throwable` through; wrap anything else by message.
fn to_throwable(exception: &(dyn StdError + Send + Sync + 'static)) -> Throwable {
    exception
        .downcast_ref::<Throwable>()
        .cloned()
        .unwrap_or_else(|| Throwable::new(exception.to_string()))
}

/// Detail message of an exception, without the class prefix.
fn error_message(exception: &(dyn StdError + Send + Sync + 'static)) -> String {
    exception
        .downcast_ref::<Throwable>()
        .map_or_else(|| exception.to_string(), |t| t.message().to_owned())
}

fn remote_error(raw: Value) -> RemoteError {
    match raw {
        Value::Throwable(t) => Box::new(t),
        other => format!("got exception: {other}").into(),
    }
}
