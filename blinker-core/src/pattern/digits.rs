//! Blink-code readout for unsigned numbers.
//!
//! Digits are shown most significant first: a digit `n` is `n` short blinks,
//! a zero is one long blink, and each digit is followed by a pause. After the
//! ones digit the line stays dark for a longer gap before the readout starts
//! over, so `25` reads as "blink blink, pause, blink x5, long gap".

use super::BlinkPattern;
use crate::timing::Millis;

/// On-time of a single blink within a non-zero digit.
pub const DIGIT_BLINK_MS: Millis = 200;
/// Off-time between blinks of the same digit.
pub const DIGIT_BLINK_GAP_MS: Millis = 200;
/// Dark time after every digit.
pub const DIGIT_PAUSE_MS: Millis = 700;
/// On-time of the single long blink that encodes a zero.
pub const ZERO_DIGIT_MS: Millis = 1_000;
/// Dark time between the ones digit and the next pass.
pub const NUMBER_GAP_MS: Millis = 1_000;

/// One step of a readout pass.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ReadoutStep {
    Digit(u8),
    Gap,
}

impl ReadoutStep {
    /// Single-pass pattern that renders this step.
    #[must_use]
    pub const fn pattern(self) -> BlinkPattern {
        match self {
            ReadoutStep::Digit(0) => BlinkPattern::new(ZERO_DIGIT_MS, 0, 1, DIGIT_PAUSE_MS, 1),
            ReadoutStep::Digit(count) => BlinkPattern::new(
                DIGIT_BLINK_MS,
                DIGIT_BLINK_GAP_MS,
                count,
                DIGIT_PAUSE_MS,
                1,
            ),
            ReadoutStep::Gap => BlinkPattern::off_for(NUMBER_GAP_MS),
        }
    }
}

/// Cursor walking the decimal digits of a number, forever.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DigitReadout {
    value: u32,
    top: u64,
    place: u64,
}

impl DigitReadout {
    /// Starts a readout at the most significant digit of `value`.
    #[must_use]
    pub fn new(value: u32) -> Self {
        let mut top = 1_u64;
        while u64::from(value) / (top * 10) != 0 {
            top *= 10;
        }
        Self {
            value,
            top,
            place: top,
        }
    }

    /// Number being displayed.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.value
    }

    /// Count of decimal digits in the value (a zero has one).
    #[must_use]
    pub fn digit_count(&self) -> u32 {
        self.top.ilog10() + 1
    }

    /// Advances the cursor and returns the step to show next.
    pub fn next_step(&mut self) -> ReadoutStep {
        if self.place == 0 {
            self.place = self.top;
            return ReadoutStep::Gap;
        }

        let digit = (u64::from(self.value) / self.place) % 10;
        self.place /= 10;
        // `digit` is a single decimal digit.
        ReadoutStep::Digit(u8::try_from(digit).unwrap_or(0))
    }

    /// Advances the cursor and returns the pattern to run next.
    pub fn next_pattern(&mut self) -> BlinkPattern {
        self.next_step().pattern()
    }
}
