//! Monotonic and UTC time representations with microsecond resolution.
//!
//! `MonotonicTime` orders events on the local node and never jumps backwards;
//! `UtcTime` carries the hardware transmission instants reported by loopback
//! frames. `UtcTime` reserves zero as the "absent / unknown" sentinel required
//! by the wire protocol, so a valid capture is never zero.

use std::ops::{Add, Sub};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Monotonic node time in microseconds since an arbitrary origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct MonotonicTime(u64);

impl MonotonicTime {
    /// The monotonic origin.
    pub const ZERO: Self = Self(0);

    /// Construct from microseconds since the origin.
    #[must_use]
    pub const fn from_usec(usec: u64) -> Self {
        Self(usec)
    }

    /// Construct from milliseconds since the origin.
    #[must_use]
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms * 1_000)
    }

    /// Microseconds since the origin.
    #[must_use]
    pub const fn as_usec(self) -> u64 {
        self.0
    }
}

impl Add<MonotonicDuration> for MonotonicTime {
    type Output = MonotonicTime;

    fn add(self, rhs: MonotonicDuration) -> MonotonicTime {
        MonotonicTime(self.0.saturating_add_signed(rhs.0))
    }
}

impl Sub for MonotonicTime {
    type Output = MonotonicDuration;

    fn sub(self, rhs: MonotonicTime) -> MonotonicDuration {
        MonotonicDuration(self.0 as i64 - rhs.0 as i64)
    }
}

/// Signed span between two monotonic instants, in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct MonotonicDuration(i64);

impl MonotonicDuration {
    /// Construct from microseconds.
    #[must_use]
    pub const fn from_usec(usec: i64) -> Self {
        Self(usec)
    }

    /// Construct from milliseconds.
    #[must_use]
    pub const fn from_millis(ms: i64) -> Self {
        Self(ms * 1_000)
    }

    /// Span in microseconds.
    #[must_use]
    pub const fn as_usec(self) -> i64 {
        self.0
    }

    /// Span in whole milliseconds (truncating).
    #[must_use]
    pub const fn as_millis(self) -> i64 {
        self.0 / 1_000
    }

    /// True for spans strictly greater than zero.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl From<Duration> for MonotonicDuration {
    fn from(d: Duration) -> Self {
        Self(d.as_micros() as i64)
    }
}

/// UTC time in microseconds since the UNIX epoch.
///
/// Zero is the sentinel for "no timestamp available"; the bus hardware never
/// reports a legitimate transmission instant of exactly zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct UtcTime(u64);

impl UtcTime {
    /// The absent-timestamp sentinel.
    pub const ZERO: Self = Self(0);

    /// Construct from microseconds since the epoch.
    #[must_use]
    pub const fn from_usec(usec: u64) -> Self {
        Self(usec)
    }

    /// Microseconds since the epoch.
    #[must_use]
    pub const fn as_usec(self) -> u64 {
        self.0
    }

    /// True for the absent-timestamp sentinel.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

/// Source of monotonic node time.
///
/// The master reads the clock once per cycle; injecting the clock keeps the
/// timing discipline testable without real delays.
pub trait Clock {
    /// Current monotonic node time.
    fn monotonic_now(&self) -> MonotonicTime;
}

/// Clock backed by [`Instant`], with its origin at construction.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Create a clock whose origin is now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn monotonic_now(&self) -> MonotonicTime {
        MonotonicTime::from_usec(self.origin.elapsed().as_micros() as u64)
    }
}

/// Manually advanced clock for tests and simulation.
///
/// Cloned handles share the same underlying time, so a test can keep a handle
/// while the component under test owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_usec: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock at the monotonic origin.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock at the given start time.
    #[must_use]
    pub fn starting_at(start: MonotonicTime) -> Self {
        let clock = Self::new();
        clock.set(start);
        clock
    }

    /// Set the current time. Going backwards is not checked; tests own the timeline.
    pub fn set(&self, now: MonotonicTime) {
        self.now_usec.store(now.as_usec(), Ordering::Release);
    }

    /// Advance the clock by a duration.
    pub fn advance(&self, d: Duration) {
        self.now_usec
            .fetch_add(d.as_micros() as u64, Ordering::AcqRel);
    }
}

impl Clock for ManualClock {
    fn monotonic_now(&self) -> MonotonicTime {
        MonotonicTime::from_usec(self.now_usec.load(Ordering::Acquire))
    }
}
