//! Board adapters that satisfy the `blinker-core` hardware traits.
//!
//! The sequencer only sees a [`MonotonicClock`] and a [`PinDriver`]; this
//! module backs them with the Embassy time driver and a GPIO push-pull output.

use blinker_core::pin::{Level, PinDriver};
use blinker_core::timing::{Millis, MonotonicClock};
use embassy_stm32::gpio::{self, Output};
use embassy_time::Instant;

/// Millisecond clock derived from the Embassy time driver.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmbassyClock;

impl MonotonicClock for EmbassyClock {
    #[allow(clippy::cast_possible_truncation)]
    fn now_millis(&self) -> Millis {
        // Truncation wraps like a 32-bit hardware tick counter.
        Instant::now().as_millis() as Millis
    }
}

/// Output lines wired to an LED on the board.
#[derive(Clone, Copy, Debug, Eq, PartialEq, defmt::Format)]
pub enum LedLine {
    /// User LED on PA5.
    User,
}

/// Drives the board LED through an Embassy [`Output`].
pub struct BoardLed<'d> {
    user: Output<'d>,
}

impl<'d> BoardLed<'d> {
    pub fn new(user: Output<'d>) -> Self {
        Self { user }
    }

    fn output(&mut self, line: LedLine) -> &mut Output<'d> {
        match line {
            LedLine::User => &mut self.user,
        }
    }
}

impl PinDriver for BoardLed<'_> {
    type Pin = LedLine;

    fn configure_output(&mut self, pin: Self::Pin) {
        // Already a push-pull output; start from a known dark state.
        self.output(pin).set_low();
        defmt::debug!("led: configured {}", pin);
    }

    fn write(&mut self, pin: Self::Pin, level: Level) {
        let level = match level {
            Level::High => gpio::Level::High,
            Level::Low => gpio::Level::Low,
        };
        self.output(pin).set_level(level);
    }
}
