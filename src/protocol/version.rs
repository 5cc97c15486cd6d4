//! Peer protocol version resolution
//!
//! Versions such as `"2.7.1"` are compared as integers where every dotted
//! component takes two decimal digits. Three-component versions are scaled
//! by 100, leaving two digits for patch-level releases: `"2.7.1"` becomes
//! `2_070_100`.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use tracing::trace;

/// Lowest peer version ("2.0.2") that understands trailing attachments.
pub const LOWEST_VERSION_FOR_RESPONSE_ATTACHMENT: i64 = 2_000_200;

/// Versions "2.0.10" through "2.6.2" shipped without attachment support.
const ATTACHMENT_GAP: std::ops::RangeInclusive<i64> = 2_001_000..=2_060_200;

/// Parse a dotted version into its integer form.
///
/// Returns `None` for empty components, non-numeric components and values
/// that overflow `i64`.
#[must_use]
pub fn parse_version(version: &str) -> Option<i64> {
    let parts: Vec<&str> = version.split('.').collect();
    let len = parts.len();

    let mut value: i64 = 0;
    for (index, part) in parts.iter().enumerate() {
        let component: i64 = part.parse().ok()?;
        let shift = u32::try_from((len - index - 1) * 2).ok()?;
        let scaled = component.checked_mul(10_i64.checked_pow(shift)?)?;
        value = value.checked_add(scaled)?;
    }

    if len == 3 { value.checked_mul(100) } else { Some(value) }
}

/// Memoized version lookups shared by every frame a codec handles.
///
/// Entries are never evicted. Concurrent misses on the same key may both
/// parse; the results are identical so the last write wins.
#[derive(Debug, Default)]
pub struct VersionCache {
    entries: RwLock<HashMap<String, i64>>,
}

impl VersionCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a version string, consulting the cache first.
    pub fn resolve(&self, version: &str) -> Option<i64> {
        if version.is_empty() {
            return None;
        }

        let cached = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(version)
            .copied();
        if cached.is_some() {
            return cached;
        }

        let Some(value) = parse_version(version) else {
            trace!(version, "malformed peer version");
            return None;
        };
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(version.to_owned(), value);
        Some(value)
    }

    /// Whether a peer running `version` accepts attachments after the body.
    pub fn supports_attachments(&self, version: &str) -> bool {
        match self.resolve(version) {
            Some(v) if ATTACHMENT_GAP.contains(&v) => false,
            Some(v) => v >= LOWEST_VERSION_FOR_RESPONSE_ATTACHMENT,
            None => false,
        }
    }

    /// Number of cached versions
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if nothing has been cached yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("2.0.2"), Some(2_000_200));
        assert_eq!(parse_version("2.0.10"), Some(2_001_000));
        assert_eq!(parse_version("2.6.2"), Some(2_060_200));
        assert_eq!(parse_version("2.7.1.1"), Some(2_070_101));
        assert_eq!(parse_version("3"), Some(3));
        assert_eq!(parse_version("2.7"), Some(207));
    }

    #[test]
    fn test_parse_malformed() {
        assert_eq!(parse_version("x.y.z"), None);
        assert_eq!(parse_version("2.7."), None);
        assert_eq!(parse_version(".2.7"), None);
        assert_eq!(parse_version("2..7"), None);
        assert_eq!(parse_version("1.2.3.4.5.6.7.8.9.10.11"), None);
    }

    #[test]
    fn test_gap_is_unsupported() {
        let cache = VersionCache::new();
        assert!(!cache.supports_attachments("2.0.10"));
        assert!(!cache.supports_attachments("2.5.0"));
        assert!(!cache.supports_attachments("2.6.2"));
        assert!(cache.supports_attachments("2.6.3"));
        assert!(cache.supports_attachments("2.7.1"));
    }

    #[test]
    fn test_below_lowest_is_unsupported() {
        let cache = VersionCache::new();
        assert!(!cache.supports_attachments("2.0.1"));
        assert!(cache.supports_attachments("2.0.2"));
        assert!(cache.supports_attachments("2.0.9"));
        assert!(!cache.supports_attachments("1.9.9"));
    }

    #[test]
    fn test_empty_and_malformed_are_unsupported() {
        let cache = VersionCache::new();
        assert!(!cache.supports_attachments(""));
        assert!(!cache.supports_attachments("x.y.z"));
        assert!(!cache.supports_attachments("2.7."));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_resolve_memoizes() {
        let cache = VersionCache::new();
        assert_eq!(cache.resolve("2.7.1"), Some(2_070_100));
        assert_eq!(cache.resolve("2.7.1"), Some(2_070_100));
        assert_eq!(cache.resolve("2.6.3"), Some(2_060_300));
        assert_eq!(cache.len(), 2);
    }
}
