//! Codec configuration

use super::{DEFAULT_MAX_FRAME_SIZE, VERSION_KEY};

/// Tunables for a [`ResponseCodec`](super::ResponseCodec).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CodecConfig {
    /// Largest frame `build` will produce, header included
    pub max_frame_size: usize,
    /// Attachment key carrying the peer's protocol version
    pub version_key: String,
}

impl CodecConfig {
    /// Set the maximum frame size
    #[must_use]
    pub fn with_max_frame_size(mut self, max_frame_size: usize) -> Self {
        self.max_frame_size = max_frame_size;
        self
    }

    /// Set the version attachment key
    #[must_use]
    pub fn with_version_key(mut self, key: impl Into<String>) -> Self {
        self.version_key = key.into();
        self
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            version_key: VERSION_KEY.to_owned(),
        }
    }
}
