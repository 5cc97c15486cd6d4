use std::sync::atomic::{AtomicU64, Ordering};

use super::types::BodyKind;

/// Track codec metrics without external dependencies.
pub(crate) struct Metrics;

static FRAMES_BUILT: AtomicU64 = AtomicU64::new(0);
static FRAMES_PARSED: AtomicU64 = AtomicU64::new(0);
static HEARTBEATS: AtomicU64 = AtomicU64::new(0);
static UNTAGGED_BODIES: AtomicU64 = AtomicU64::new(0);
static WITH_ATTACHMENTS: AtomicU64 = AtomicU64::new(0);
static UNKNOWN_TAGS: AtomicU64 = AtomicU64::new(0);
static ERROR_COUNT: AtomicU64 = AtomicU64::new(0);
static OVERSIZE_COUNT: AtomicU64 = AtomicU64::new(0);
static BYTES_BUILT: AtomicU64 = AtomicU64::new(0);
static LARGEST_FRAME: AtomicU64 = AtomicU64::new(0);

struct BodyKindCounters {
    exception: AtomicU64,
    value: AtomicU64,
    null: AtomicU64,
}

static BODY_COUNTERS: BodyKindCounters = BodyKindCounters::new();

impl BodyKindCounters {
    const fn new() -> Self {
        Self {
            exception: AtomicU64::new(0),
            value: AtomicU64::new(0),
            null: AtomicU64::new(0),
        }
    }

    fn increment(&self, kind: BodyKind) {
        match kind {
            BodyKind::Exception => self.exception.fetch_add(1, Ordering::Relaxed),
            BodyKind::Value => self.value.fetch_add(1, Ordering::Relaxed),
            BodyKind::Null => self.null.fetch_add(1, Ordering::Relaxed),
        };
    }
}

/// What a built frame carried.
#[derive(Clone, Copy)]
pub(crate) enum FrameBody {
    Heartbeat,
    Tagged { kind: BodyKind, attachments: bool },
    Untagged,
}

impl Metrics {
    #[inline]
    pub(crate) fn record_built(body: FrameBody, len: usize) {
        FRAMES_BUILT.fetch_add(1, Ordering::Relaxed);
        let len = u64::try_from(len).unwrap_or(u64::MAX);
        BYTES_BUILT.fetch_add(len, Ordering::Relaxed);
        update_max(&LARGEST_FRAME, len);
        match body {
            FrameBody::Heartbeat => {
                HEARTBEATS.fetch_add(1, Ordering::Relaxed);
            }
            FrameBody::Tagged { kind, attachments } => {
                BODY_COUNTERS.increment(kind);
                if attachments {
                    WITH_ATTACHMENTS.fetch_add(1, Ordering::Relaxed);
                }
            }
            FrameBody::Untagged => {
                UNTAGGED_BODIES.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    #[inline]
    pub(crate) fn record_parsed(kind: Option<BodyKind>) {
        FRAMES_PARSED.fetch_add(1, Ordering::Relaxed);
        match kind {
            Some(kind) => BODY_COUNTERS.increment(kind),
            None => {
                UNKNOWN_TAGS.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    #[inline]
    pub(crate) fn record_error() {
        ERROR_COUNT.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_oversize() {
        OVERSIZE_COUNT.fetch_add(1, Ordering::Relaxed);
        ERROR_COUNT.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn totals() -> MetricsSnapshot {
        MetricsSnapshot {
            frames_built: FRAMES_BUILT.load(Ordering::Relaxed),
            frames_parsed: FRAMES_PARSED.load(Ordering::Relaxed),
            exception_bodies: BODY_COUNTERS.exception.load(Ordering::Relaxed),
            value_bodies: BODY_COUNTERS.value.load(Ordering::Relaxed),
            null_bodies: BODY_COUNTERS.null.load(Ordering::Relaxed),
            heartbeats: HEARTBEATS.load(Ordering::Relaxed),
            untagged_bodies: UNTAGGED_BODIES.load(Ordering::Relaxed),
            with_attachments: WITH_ATTACHMENTS.load(Ordering::Relaxed),
            unknown_tags: UNKNOWN_TAGS.load(Ordering::Relaxed),
            total_errors: ERROR_COUNT.load(Ordering::Relaxed),
            oversize_frames: OVERSIZE_COUNT.load(Ordering::Relaxed),
            bytes_built: BYTES_BUILT.load(Ordering::Relaxed),
            largest_frame: LARGEST_FRAME.load(Ordering::Relaxed),
        }
    }
}

fn update_max(target: &AtomicU64, candidate: u64) {
    let mut current = target.load(Ordering::Relaxed);
    while candidate > current {
        match target.compare_exchange_weak(
            current,
            candidate,
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => return,
            Err(old) => current = old,
        }
    }
}

/// Process-wide snapshot of codec counters.
#[derive(Default, Debug, Clone, Copy)]
pub struct MetricsSnapshot {
    /// Frames produced by `build`
    pub frames_built: u64,
    /// Bodies consumed by `parse`
    pub frames_parsed: u64,
    /// Exception bodies built or parsed
    pub exception_bodies: u64,
    /// Value bodies built or parsed
    pub value_bodies: u64,
    /// Null bodies built or parsed
    pub null_bodies: u64,
    /// Heartbeat replies built
    pub heartbeats: u64,
    /// Non-OK bodies built without a discriminator
    pub untagged_bodies: u64,
    /// Frames built with trailing attachments
    pub with_attachments: u64,
    /// Bodies parsed with an unrecognized discriminator
    pub unknown_tags: u64,
    /// Failed builds and parses
    pub total_errors: u64,
    /// Builds rejected for size
    pub oversize_frames: u64,
    /// Sum of built frame lengths
    pub bytes_built: u64,
    /// Largest frame built
    pub largest_frame: u64,
}

impl MetricsSnapshot {
    /// Average built frame size in bytes.
    #[must_use]
    pub fn avg_frame_size(&self) -> Option<u64> {
        if self.frames_built == 0 {
            return None;
        }
        Some(self.bytes_built / self.frames_built)
    }
}

/// Read the current codec counters.
#[must_use]
pub fn snapshot() -> MetricsSnapshot {
    Metrics::totals()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_max_only_grows() {
        let target = AtomicU64::new(10);
        update_max(&target, 5);
        assert_eq!(target.load(Ordering::Relaxed), 10);
        update_max(&target, 20);
        assert_eq!(target.load(Ordering::Relaxed), 20);
    }

    #[test]
    fn test_avg_frame_size() {
        let empty = MetricsSnapshot::default();
        assert_eq!(empty.avg_frame_size(), None);

        let snap = MetricsSnapshot {
            frames_built: 4,
            bytes_built: 100,
            ..MetricsSnapshot::default()
        };
        assert_eq!(snap.avg_frame_size(), Some(25));
    }
}
