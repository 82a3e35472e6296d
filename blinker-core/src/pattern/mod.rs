//! Blink pattern definitions and the pulse arithmetic behind them.
//!
//! A [`BlinkPattern`] describes one repetition as `blinks` on/off cycles
//! followed by a pause, where the pause replaces the off-phase of the final
//! cycle. Everything here is pure: given the time elapsed since a sequence
//! started, [`BlinkPattern::position`] answers whether the line should be
//! high, low, or whether the sequence is over.

use core::fmt;

use crate::pin::Level;
use crate::timing::Millis;

pub mod digits;

pub use digits::{DigitReadout, ReadoutStep};

/// On-time used by [`BlinkPattern::default_blink`].
pub const DEFAULT_BLINK_ON_MS: Millis = 500;
/// Off-time used by [`BlinkPattern::default_blink`].
pub const DEFAULT_BLINK_OFF_MS: Millis = 500;

/// Where a sequence stands at a given elapsed time.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PatternPosition {
    /// Drive the line to this level.
    Level(Level),
    /// Every repetition has run (or there was nothing to schedule).
    Finished,
}

/// On/off pulse train with a trailing pause, repeated `repeats` times.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct BlinkPattern {
    pub on_ms: Millis,
    pub off_ms: Millis,
    /// On-pulses per repetition; zero marks the idle pattern.
    pub blinks: u8,
    pub pause_ms: Millis,
    /// Number of repetitions; zero repeats forever.
    pub repeats: u16,
}

impl BlinkPattern {
    /// Canonical "no sequence" pattern.
    pub const IDLE: Self = Self::new(0, 0, 0, 0, 0);

    pub const fn new(
        on_ms: Millis,
        off_ms: Millis,
        blinks: u8,
        pause_ms: Millis,
        repeats: u16,
    ) -> Self {
        Self {
            on_ms,
            off_ms,
            blinks,
            pause_ms,
            repeats,
        }
    }

    /// Line held high indefinitely.
    #[must_use]
    pub const fn hold_on() -> Self {
        Self::new(1, 0, 1, 0, 0)
    }

    /// Line held low indefinitely.
    #[must_use]
    pub const fn hold_off() -> Self {
        Self::new(0, 1, 1, 1, 0)
    }

    /// Line high for `duration_ms`, then the sequence completes.
    ///
    /// The off-phase only keeps the cycle defined; the pause swallows it, so
    /// a zero duration yields an empty repetition that completes at once.
    #[must_use]
    pub const fn on_for(duration_ms: Millis) -> Self {
        Self::new(duration_ms, 1, 1, 0, 1)
    }

    /// Line low for `duration_ms`, then the sequence completes.
    ///
    /// The single off-phase is swallowed by the pause, so the repetition
    /// lasts exactly `duration_ms` with the line low throughout.
    #[must_use]
    pub const fn off_for(duration_ms: Millis) -> Self {
        Self::new(0, 1, 1, duration_ms, 1)
    }

    /// Endless 1 Hz square wave.
    #[must_use]
    pub const fn default_blink() -> Self {
        Self::new(
            DEFAULT_BLINK_ON_MS,
            DEFAULT_BLINK_OFF_MS,
            1,
            DEFAULT_BLINK_OFF_MS,
            0,
        )
    }

    /// Returns `true` for patterns that schedule nothing.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.blinks == 0
    }

    /// Returns `true` when the pattern never completes on its own.
    #[must_use]
    pub const fn is_endless(&self) -> bool {
        self.repeats == 0
    }

    /// Applies the timing floor and the zero-cycle guard.
    ///
    /// Non-zero durations shorter than `floor` are raised to it; a zero
    /// duration stays zero and skips its phase. A pattern whose on- and
    /// off-phases are both zero has an undefined cycle and becomes idle.
    #[must_use]
    pub const fn normalized(self, floor: Millis) -> Self {
        let mut pattern = Self {
            on_ms: clamp_phase(self.on_ms, floor),
            off_ms: clamp_phase(self.off_ms, floor),
            blinks: self.blinks,
            pause_ms: clamp_phase(self.pause_ms, floor),
            repeats: self.repeats,
        };
        if pattern.on_ms == 0 && pattern.off_ms == 0 {
            pattern.blinks = 0;
        }
        pattern
    }

    /// One on-phase plus one off-phase.
    #[must_use]
    pub fn cycle_ms(&self) -> u64 {
        u64::from(self.on_ms) + u64::from(self.off_ms)
    }

    /// Time spent alternating cycles within one repetition.
    #[must_use]
    pub fn blink_phase_ms(&self) -> u64 {
        self.cycle_ms() * u64::from(self.blinks)
    }

    /// Length of one repetition: the blink phase plus the pause, minus the
    /// final off-phase that the pause replaces.
    #[must_use]
    pub fn repetition_ms(&self) -> u64 {
        (self.blink_phase_ms() + u64::from(self.pause_ms)).saturating_sub(u64::from(self.off_ms))
    }

    /// Total run time for finite patterns, `None` for endless ones.
    #[must_use]
    pub fn total_ms(&self) -> Option<u64> {
        if self.is_endless() {
            None
        } else {
            Some(self.repetition_ms() * u64::from(self.repeats))
        }
    }

    /// Maps elapsed time since the sequence started onto a line level.
    #[must_use]
    pub fn position(&self, elapsed: Millis) -> PatternPosition {
        let repetition = self.repetition_ms();
        if self.is_idle() || repetition == 0 {
            return PatternPosition::Finished;
        }

        let elapsed = u64::from(elapsed);
        if !self.is_endless() && elapsed / repetition >= u64::from(self.repeats) {
            return PatternPosition::Finished;
        }

        let cycle = self.cycle_ms();
        let offset = elapsed % repetition;
        let high =
            cycle != 0 && offset < self.blink_phase_ms() && offset % cycle < u64::from(self.on_ms);
        PatternPosition::Level(Level::from_high(high))
    }
}

impl Default for BlinkPattern {
    fn default() -> Self {
        Self::IDLE
    }
}

impl fmt::Display for BlinkPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_idle() {
            return f.write_str("idle");
        }
        write!(
            f,
            "on={}ms off={}ms blinks={} pause={}ms",
            self.on_ms, self.off_ms, self.blinks, self.pause_ms
        )?;
        if self.is_endless() {
            f.write_str(" repeats=forever")
        } else {
            write!(f, " repeats={}", self.repeats)
        }
    }
}

const fn clamp_phase(duration: Millis, floor: Millis) -> Millis {
    if duration == 0 || duration >= floor {
        duration
    } else {
        floor
    }
}
