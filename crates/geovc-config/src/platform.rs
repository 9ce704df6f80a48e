//! Wall clock and time-zone access.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{Local, Offset, TimeZone, Utc};

/// Source of commit timestamps.
pub trait Platform: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> i64;

    /// Local offset from UTC, in milliseconds, at `timestamp_ms`.
    fn tz_offset_ms(&self, timestamp_ms: i64) -> i32;
}

/// The host clock and local time zone.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemPlatform;

impl Platform for SystemPlatform {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    fn tz_offset_ms(&self, timestamp_ms: i64) -> i32 {
        Local
            .timestamp_millis_opt(timestamp_ms)
            .single()
            .map_or(0, |dt| dt.offset().fix().local_minus_utc() * 1000)
    }
}

/// Deterministic clock: every `now_ms` call returns the current value and
/// advances it by `step_ms`.
#[derive(Debug)]
pub struct FixedPlatform {
    next_ms: AtomicI64,
    step_ms: i64,
    tz_offset_ms: i32,
}

impl FixedPlatform {
    /// Clock starting at `start_ms`, advancing `step_ms` per reading.
    pub fn new(start_ms: i64, step_ms: i64) -> Self {
        Self {
            next_ms: AtomicI64::new(start_ms),
            step_ms,
            tz_offset_ms: 0,
        }
    }

    /// Report `tz_offset_ms` as the local zone offset.
    pub fn with_tz_offset(mut self, tz_offset_ms: i32) -> Self {
        self.tz_offset_ms = tz_offset_ms;
        self
    }

    /// The value the next `now_ms` call will return.
    pub fn peek_ms(&self) -> i64 {
        self.next_ms.load(Ordering::SeqCst)
    }
}

impl Platform for FixedPlatform {
    fn now_ms(&self) -> i64 {
        self.next_ms.fetch_add(self.step_ms, Ordering::SeqCst)
    }

    fn tz_offset_ms(&self, _timestamp_ms: i64) -> i32 {
        self.tz_offset_ms
    }
}
