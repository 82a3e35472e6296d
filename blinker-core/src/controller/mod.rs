//! LED controller façade shared by the firmware task and the emulator.
//!
//! [`LedController`] owns the [`SequenceTimer`] for one line and layers the
//! pieces a runtime needs on top of it: translating [`LedCommand`]s into
//! patterns, chaining the per-digit patterns of a number readout as each one
//! completes, counting completions, and keeping a telemetry trail of starts,
//! edges, and stops.

use core::fmt;

use crate::pattern::{BlinkPattern, DigitReadout};
use crate::pin::PinDriver;
use crate::repl::status::StatusSnapshot;
use crate::sequencer::{PollOutcome, SequenceTimer};
use crate::telemetry::{TelemetryEventKind, TelemetryRecorder};
use crate::timing::{Millis, MonotonicClock};

/// Requests accepted by the controller.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LedCommand {
    On,
    Off,
    OnFor(Millis),
    OffFor(Millis),
    Blink(BlinkPattern),
    DefaultBlink,
    Show(u32),
    Stop,
}

impl fmt::Display for LedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedCommand::On => f.write_str("on"),
            LedCommand::Off => f.write_str("off"),
            LedCommand::OnFor(duration) => write!(f, "on-for {duration}ms"),
            LedCommand::OffFor(duration) => write!(f, "off-for {duration}ms"),
            LedCommand::Blink(pattern) => write!(f, "blink {pattern}"),
            LedCommand::DefaultBlink => f.write_str("blink default"),
            LedCommand::Show(value) => write!(f, "show {value}"),
            LedCommand::Stop => f.write_str("stop"),
        }
    }
}

/// Drives one LED from commands and a polling loop.
pub struct LedController<P, C>
where
    P: PinDriver,
{
    timer: SequenceTimer<P, C>,
    readout: Option<DigitReadout>,
    completions: u32,
    telemetry: TelemetryRecorder,
}

impl<P, C> LedController<P, C>
where
    P: PinDriver,
    C: MonotonicClock,
{
    pub fn new(timer: SequenceTimer<P, C>) -> Self {
        Self {
            timer,
            readout: None,
            completions: 0,
            telemetry: TelemetryRecorder::new(),
        }
    }

    /// Binds (or rebinds) the LED line.
    pub fn assign_pin(&mut self, pin: P::Pin) {
        self.timer.assign_pin(pin);
        self.record(TelemetryEventKind::PinAssigned);
    }

    /// Replaces whatever the LED is doing with `command`.
    pub fn apply(&mut self, command: LedCommand) -> PollOutcome {
        self.readout = None;
        match command {
            LedCommand::On => {
                let outcome = self.timer.on();
                self.started(outcome)
            }
            LedCommand::Off => {
                let outcome = self.timer.off();
                self.started(outcome)
            }
            LedCommand::OnFor(duration) => {
                let outcome = self.timer.on_for(duration, None);
                self.started(outcome)
            }
            LedCommand::OffFor(duration) => {
                let outcome = self.timer.off_for(duration, None);
                self.started(outcome)
            }
            LedCommand::Blink(pattern) => {
                let outcome = self.timer.start(pattern, None);
                self.started(outcome)
            }
            LedCommand::DefaultBlink => {
                let outcome = self.timer.blink_default();
                self.started(outcome)
            }
            LedCommand::Show(value) => {
                let mut readout = DigitReadout::new(value);
                let first = readout.next_pattern();
                self.readout = Some(readout);
                let outcome = self.timer.start(first, None);
                self.started(outcome)
            }
            LedCommand::Stop => {
                self.timer.stop();
                self.record(TelemetryEventKind::SequenceStopped);
                PollOutcome::Idle
            }
        }
    }

    /// Polls the underlying timer; call from every control-loop iteration.
    pub fn poll(&mut self) -> PollOutcome {
        let outcome = self.timer.poll();
        self.observe(outcome)
    }

    fn started(&mut self, outcome: PollOutcome) -> PollOutcome {
        self.record(TelemetryEventKind::SequenceStarted);
        self.observe(outcome)
    }

    fn observe(&mut self, outcome: PollOutcome) -> PollOutcome {
        match outcome {
            PollOutcome::Driven { level, edge: true } => {
                self.record(TelemetryEventKind::LevelChanged(level));
            }
            PollOutcome::Completed => {
                self.completions = self.completions.wrapping_add(1);
                self.record(TelemetryEventKind::SequenceCompleted);

                if let Some(readout) = self.readout.as_mut() {
                    let next = readout.next_pattern();
                    let follow = self.timer.start(next, None);
                    self.record(TelemetryEventKind::SequenceStarted);
                    if let PollOutcome::Driven { level, edge: true } = follow {
                        self.record(TelemetryEventKind::LevelChanged(level));
                    }
                }
            }
            PollOutcome::Driven { .. } | PollOutcome::RateLimited | PollOutcome::Idle => {}
        }
        outcome
    }

    fn record(&mut self, event: TelemetryEventKind) {
        let now = self.timer.clock().now_millis();
        self.telemetry.record(event, now);
    }

    /// Snapshot consumed by the `status` console command.
    pub fn status(&self) -> StatusSnapshot {
        StatusSnapshot {
            state: self.timer.state(),
            level: self.timer.last_level(),
            pattern: self.timer.pattern(),
            elapsed_ms: self.timer.elapsed(),
            completions: self.completions,
            readout: self.readout.map(|readout| readout.value()),
        }
    }

    /// Number of finite sequences that ran to completion.
    pub fn completions(&self) -> u32 {
        self.completions
    }

    pub fn telemetry(&self) -> &TelemetryRecorder {
        &self.telemetry
    }

    pub fn timer(&self) -> &SequenceTimer<P, C> {
        &self.timer
    }

    pub fn clock(&self) -> &C {
        self.timer.clock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pin::{Level, RecordingPinDriver};
    use crate::sequencer::TimerState;
    use crate::timing::ManualClock;

    const LED: u8 = 2;

    fn controller(clock: &ManualClock) -> LedController<RecordingPinDriver<32>, &ManualClock> {
        let mut controller = LedController::new(SequenceTimer::new(RecordingPinDriver::new(), clock));
        controller.assign_pin(LED);
        controller
    }

    fn run_for(controller: &mut LedController<RecordingPinDriver<32>, &ManualClock>, ms: u32) {
        for _ in 0..ms / 10 {
            controller.clock().advance(10);
            controller.poll();
        }
    }

    #[test]
    fn on_for_completes_and_counts() {
        let clock = ManualClock::new(0);
        let mut controller = controller(&clock);

        controller.apply(LedCommand::OnFor(300));
        run_for(&mut controller, 400);

        assert_eq!(controller.completions(), 1);
        assert_eq!(controller.status().state, TimerState::Idle);
        assert_eq!(
            controller.telemetry().latest().map(|record| record.event),
            Some(TelemetryEventKind::SequenceCompleted)
        );
    }

    #[test]
    fn zero_length_on_for_completes_at_once() {
        let clock = ManualClock::new(0);
        let mut controller = controller(&clock);

        assert_eq!(controller.apply(LedCommand::OnFor(0)), PollOutcome::Completed);
        run_for(&mut controller, 200);

        assert_eq!(controller.completions(), 1);
        assert_eq!(controller.status().state, TimerState::Idle);
    }

    #[test]
    fn off_holds_line_low() {
        let clock = ManualClock::new(0);
        let mut controller = controller(&clock);

        controller.apply(LedCommand::Off);
        run_for(&mut controller, 2_000);

        assert_eq!(controller.timer().driver().level(LED), Some(Level::Low));
        assert_eq!(controller.status().state, TimerState::Running);
        assert_eq!(controller.completions(), 0);
    }

    #[test]
    fn show_chains_digit_patterns() {
        let clock = ManualClock::new(0);
        let mut controller = controller(&clock);

        controller.apply(LedCommand::Show(21));
        assert_eq!(controller.status().readout, Some(21));

        // "2" lasts 2*400 + 700 - 200 = 1300 ms.
        run_for(&mut controller, 1_300);
        assert_eq!(controller.completions(), 1);
        assert_eq!(controller.status().state, TimerState::Running);
        assert_eq!(controller.status().pattern.blinks, 1);
        assert_eq!(controller.timer().last_level(), Some(Level::High));
    }

    #[test]
    fn new_command_cancels_readout() {
        let clock = ManualClock::new(0);
        let mut controller = controller(&clock);

        controller.apply(LedCommand::Show(7));
        controller.apply(LedCommand::On);

        assert_eq!(controller.status().readout, None);
        run_for(&mut controller, 5_000);
        assert_eq!(controller.completions(), 0);
    }

    #[test]
    fn stop_leaves_line_and_records_event() {
        let clock = ManualClock::new(0);
        let mut controller = controller(&clock);

        controller.apply(LedCommand::DefaultBlink);
        controller.apply(LedCommand::Stop);

        assert_eq!(controller.status().state, TimerState::Idle);
        assert_eq!(controller.timer().driver().level(LED), Some(Level::High));
        assert_eq!(
            controller.telemetry().latest().map(|record| record.event),
            Some(TelemetryEventKind::SequenceStopped)
        );
    }
}
