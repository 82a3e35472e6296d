//! Output-line abstractions consumed by the sequencer.
//!
//! The timer never talks to GPIO registers directly. Firmware and host
//! targets hand it a [`PinDriver`] that knows how to configure a line for
//! output and drive it to a [`Level`]; failures are not surfaced, matching
//! the fire-and-forget nature of microcontroller GPIO writes.

use core::fmt;

use heapless::{HistoryBuf, Vec};

/// Logical level driven onto an output line.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Level {
    Low,
    High,
}

impl Level {
    /// Converts a boolean "is high" flag into a [`Level`].
    #[must_use]
    pub const fn from_high(high: bool) -> Self {
        if high { Level::High } else { Level::Low }
    }

    /// Returns `true` for [`Level::High`].
    #[must_use]
    pub const fn is_high(self) -> bool {
        matches!(self, Level::High)
    }

    /// Short lowercase label used by logs and the console.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Level::Low => "low",
            Level::High => "high",
        }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        Level::from_high(high)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Abstraction over the physical output lines.
pub trait PinDriver {
    /// Identifier for a line (a GPIO number, a board LED enum, ...).
    type Pin: Copy + Eq + fmt::Debug;

    /// Configures the line as a push-pull output.
    fn configure_output(&mut self, pin: Self::Pin);

    /// Drives the line to the requested level.
    fn write(&mut self, pin: Self::Pin, level: Level);
}

impl<T> PinDriver for &mut T
where
    T: PinDriver + ?Sized,
{
    type Pin = T::Pin;

    fn configure_output(&mut self, pin: Self::Pin) {
        (**self).configure_output(pin);
    }

    fn write(&mut self, pin: Self::Pin, level: Level) {
        (**self).write(pin, level);
    }
}

/// Maximum number of distinct lines a [`RecordingPinDriver`] tracks as configured.
pub const MAX_RECORDED_PINS: usize = 8;

/// Single write observed by a [`RecordingPinDriver`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PinWrite {
    pub pin: u8,
    pub level: Level,
}

/// Pin driver that remembers what it was asked to do.
///
/// Host tests and the emulator use it in place of real GPIO: it keeps the
/// most recent `N` writes in a ring, a running write counter, and the list of
/// lines that were configured for output.
pub struct RecordingPinDriver<const N: usize = 64> {
    configured: Vec<u8, MAX_RECORDED_PINS>,
    writes: HistoryBuf<PinWrite, N>,
    write_count: usize,
}

impl<const N: usize> RecordingPinDriver<N> {
    /// Creates an empty recorder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            configured: Vec::new(),
            writes: HistoryBuf::new(),
            write_count: 0,
        }
    }

    /// Lines configured for output, in the order they were first configured.
    pub fn configured(&self) -> &[u8] {
        &self.configured
    }

    /// Total number of writes performed, including ones evicted from the ring.
    pub fn write_count(&self) -> usize {
        self.write_count
    }

    /// Most recent write, if any.
    pub fn last_write(&self) -> Option<PinWrite> {
        self.writes.recent().copied()
    }

    /// Most recent level written to `pin`, if it is still held in the ring.
    pub fn level(&self, pin: u8) -> Option<Level> {
        self.writes
            .oldest_ordered()
            .filter(|write| write.pin == pin)
            .last()
            .map(|write| write.level)
    }

    /// Retained writes in chronological order.
    pub fn writes(&self) -> impl Iterator<Item = &PinWrite> + '_ {
        self.writes.oldest_ordered()
    }
}

impl<const N: usize> Default for RecordingPinDriver<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> PinDriver for RecordingPinDriver<N> {
    type Pin = u8;

    fn configure_output(&mut self, pin: Self::Pin) {
        if !self.configured.contains(&pin) {
            // Silently stop tracking once the table is full.
            let _ = self.configured.push(pin);
        }
    }

    fn write(&mut self, pin: Self::Pin, level: Level) {
        self.writes.write(PinWrite { pin, level });
        self.write_count = self.write_count.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_converts_from_bool() {
        assert_eq!(Level::from(true), Level::High);
        assert_eq!(Level::from(false), Level::Low);
        assert!(Level::High.is_high());
        assert!(!Level::Low.is_high());
    }

    #[test]
    fn recorder_tracks_configuration_once() {
        let mut driver: RecordingPinDriver<4> = RecordingPinDriver::new();
        driver.configure_output(13);
        driver.configure_output(13);
        driver.configure_output(7);

        assert_eq!(driver.configured(), &[13, 7]);
    }

    #[test]
    fn recorder_reports_latest_level_per_pin() {
        let mut driver: RecordingPinDriver<4> = RecordingPinDriver::new();
        driver.write(13, Level::High);
        driver.write(7, Level::High);
        driver.write(13, Level::Low);

        assert_eq!(driver.level(13), Some(Level::Low));
        assert_eq!(driver.level(7), Some(Level::High));
        assert_eq!(driver.level(2), None);
        assert_eq!(driver.write_count(), 3);
        assert_eq!(
            driver.last_write(),
            Some(PinWrite {
                pin: 13,
                level: Level::Low
            })
        );
    }

    #[test]
    fn recorder_counts_evicted_writes() {
        let mut driver: RecordingPinDriver<2> = RecordingPinDriver::new();
        for _ in 0..5 {
            driver.write(1, Level::High);
        }

        assert_eq!(driver.write_count(), 5);
        assert_eq!(driver.writes().count(), 2);
    }
}
