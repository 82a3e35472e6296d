//! Monotonic millisecond clock and sequencer tunables.
//!
//! Timestamps are plain `u32` millisecond counters that wrap at their bit
//! width, mirroring the free-running tick counters exposed by most MCU HALs.
//! All elapsed-time arithmetic in this crate uses wrapping subtraction, so a
//! counter rollover between two samples is harmless.
//!
//! Known limit: elapsed time since a sequence started is itself a `u32`, so a
//! single run longer than `u32::MAX` ms (about 49.7 days) wraps back to zero.
//! An endless pattern whose repetition length does not divide 2^32 jumps
//! phase at that point.

use core::cell::Cell;

/// Millisecond timestamp read from a [`MonotonicClock`].
pub type Millis = u32;

/// Default minimum time between two pin evaluations, in milliseconds.
pub const MIN_INTERVAL_MS: Millis = 20;

/// Source of monotonic time for the sequencer.
pub trait MonotonicClock {
    /// Current time in milliseconds, wrapping at `u32::MAX`.
    fn now_millis(&self) -> Millis;
}

impl<T> MonotonicClock for &T
where
    T: MonotonicClock + ?Sized,
{
    fn now_millis(&self) -> Millis {
        (**self).now_millis()
    }
}

/// Clock advanced by hand; backs the emulator and host tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Millis>,
}

impl ManualClock {
    /// Creates a clock frozen at `start`.
    #[must_use]
    pub const fn new(start: Millis) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    /// Jumps to an absolute timestamp.
    pub fn set(&self, now: Millis) {
        self.now.set(now);
    }

    /// Moves the clock forward, wrapping like a hardware counter.
    pub fn advance(&self, delta: Millis) {
        self.now.set(self.now.get().wrapping_add(delta));
    }
}

impl MonotonicClock for ManualClock {
    fn now_millis(&self) -> Millis {
        self.now.get()
    }
}

/// Runtime configuration for a sequence timer.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SequencerConfig {
    /// Minimum time between pin evaluations; also the floor applied to
    /// non-zero phase durations.
    pub min_interval_ms: Millis,
}

impl SequencerConfig {
    /// Configuration used when nothing else is requested.
    pub const DEFAULT: Self = Self {
        min_interval_ms: MIN_INTERVAL_MS,
    };

    /// Builds a configuration with a custom rate-limit interval.
    #[must_use]
    pub const fn with_min_interval(min_interval_ms: Millis) -> Self {
        Self { min_interval_ms }
    }

    /// Smallest duration a non-zero phase may last.
    #[must_use]
    pub const fn duration_floor(&self) -> Millis {
        if self.min_interval_ms == 0 {
            1
        } else {
            self.min_interval_ms
        }
    }
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_wraps_on_advance() {
        let clock = ManualClock::new(u32::MAX - 5);
        clock.advance(10);
        assert_eq!(clock.now_millis(), 4);
    }

    #[test]
    fn clock_reference_reads_through() {
        let clock = ManualClock::new(42);
        let borrowed = &clock;
        assert_eq!(MonotonicClock::now_millis(&borrowed), 42);
    }

    #[test]
    fn zero_interval_keeps_positive_floor() {
        assert_eq!(SequencerConfig::with_min_interval(0).duration_floor(), 1);
        assert_eq!(SequencerConfig::DEFAULT.duration_floor(), MIN_INTERVAL_MS);
    }
}
