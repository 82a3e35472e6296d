//! Non-blocking blink sequencer for a single output line.
//!
//! [`SequenceTimer`] owns one pin's pulse configuration and is driven by the
//! caller's control loop: every iteration calls [`SequenceTimer::poll`], which
//! rate-limits itself, works out the level for the current instant, and either
//! drives the line or, once a finite sequence has run its course, goes idle and
//! hands control to the completion handler. Nothing here blocks or allocates,
//! and each poll costs a handful of integer operations.

use crate::pattern::{BlinkPattern, PatternPosition};
use crate::pin::{Level, PinDriver};
use crate::timing::{Millis, MonotonicClock, SequencerConfig};

/// Work to run once when a finite sequence completes.
///
/// The handler is consumed when it fires, so a handler can never run twice
/// for the same `start`. Any `FnOnce()` closure qualifies.
pub trait CompletionHandler {
    fn on_complete(self);
}

impl<F> CompletionHandler for F
where
    F: FnOnce(),
{
    fn on_complete(self) {
        self();
    }
}

/// Type-erased handler for callers that need to mix closures on one timer.
#[cfg(feature = "alloc")]
pub type BoxedCompletion<'a> = alloc::boxed::Box<dyn FnOnce() + 'a>;

/// Coarse lifecycle of a timer.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TimerState {
    Idle,
    Running,
}

impl TimerState {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            TimerState::Idle => "idle",
            TimerState::Running => "running",
        }
    }
}

/// Result of a single evaluation step.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PollOutcome {
    /// Called again before the minimum interval elapsed; nothing happened.
    RateLimited,
    /// No sequence is active or no pin is bound; nothing was written.
    Idle,
    /// The line was driven to `level`; `edge` is set when it differs from the
    /// previously driven level.
    Driven { level: Level, edge: bool },
    /// The sequence finished on this step and the timer is now idle.
    Completed,
}

impl PollOutcome {
    /// Level written on this step, if any.
    #[must_use]
    pub const fn level(self) -> Option<Level> {
        match self {
            PollOutcome::Driven { level, .. } => Some(level),
            _ => None,
        }
    }
}

/// Blink sequencer bound to one output line.
pub struct SequenceTimer<P, C, H = fn()>
where
    P: PinDriver,
{
    driver: P,
    clock: C,
    config: SequencerConfig,
    pin: Option<P::Pin>,
    pattern: BlinkPattern,
    handler: Option<H>,
    started_at: Option<Millis>,
    last_poll: Option<Millis>,
    last_level: Option<Level>,
}

impl<P, C, H> SequenceTimer<P, C, H>
where
    P: PinDriver,
    C: MonotonicClock,
    H: CompletionHandler,
{
    /// Creates an idle timer with no pin bound.
    pub fn new(driver: P, clock: C) -> Self {
        Self::with_config(driver, clock, SequencerConfig::DEFAULT)
    }

    /// Creates an idle timer with custom tunables.
    pub fn with_config(driver: P, clock: C, config: SequencerConfig) -> Self {
        Self {
            driver,
            clock,
            config,
            pin: None,
            pattern: BlinkPattern::IDLE,
            handler: None,
            started_at: None,
            last_poll: None,
            last_level: None,
        }
    }

    /// Creates an idle timer and binds `pin` straight away.
    pub fn with_pin(driver: P, clock: C, pin: P::Pin) -> Self {
        let mut timer = Self::new(driver, clock);
        timer.assign_pin(pin);
        timer
    }

    /// Configures `pin` for output and makes it the driven line.
    ///
    /// A running sequence restarts from time zero on the new line; the
    /// previously bound line keeps whatever level it last had.
    pub fn assign_pin(&mut self, pin: P::Pin) {
        self.driver.configure_output(pin);
        self.pin = Some(pin);
        self.last_level = None;

        if self.state() == TimerState::Running {
            self.started_at = Some(self.clock.now_millis());
            self.last_poll = None;
            self.poll();
        }
    }

    /// Replaces the active sequence and evaluates it once.
    ///
    /// Durations are normalized against the configured floor first, so a
    /// pattern with both phases at zero leaves the timer idle. When this
    /// returns, the line already shows time zero of the new sequence.
    pub fn start(&mut self, pattern: BlinkPattern, handler: Option<H>) -> PollOutcome {
        self.pattern = pattern.normalized(self.config.duration_floor());
        self.handler = handler;
        self.started_at = Some(self.clock.now_millis());
        self.last_poll = None;
        self.poll()
    }

    /// [`start`](Self::start) taking the raw pattern parameters.
    pub fn start_with(
        &mut self,
        on_ms: Millis,
        off_ms: Millis,
        blinks: u8,
        pause_ms: Millis,
        repeats: u16,
        handler: Option<H>,
    ) -> PollOutcome {
        self.start(
            BlinkPattern::new(on_ms, off_ms, blinks, pause_ms, repeats),
            handler,
        )
    }

    /// Holds the line high until replaced.
    pub fn on(&mut self) -> PollOutcome {
        self.start(BlinkPattern::hold_on(), None)
    }

    /// Holds the line low until replaced.
    pub fn off(&mut self) -> PollOutcome {
        self.start(BlinkPattern::hold_off(), None)
    }

    /// Holds the line high for `duration_ms`, then completes.
    pub fn on_for(&mut self, duration_ms: Millis, handler: Option<H>) -> PollOutcome {
        self.start(BlinkPattern::on_for(duration_ms), handler)
    }

    /// Holds the line low for `duration_ms`, then completes.
    pub fn off_for(&mut self, duration_ms: Millis, handler: Option<H>) -> PollOutcome {
        self.start(BlinkPattern::off_for(duration_ms), handler)
    }

    /// Starts the endless 1 Hz blink.
    pub fn blink_default(&mut self) -> PollOutcome {
        self.start(BlinkPattern::default_blink(), None)
    }

    /// Abandons the active sequence without firing its handler.
    ///
    /// The line keeps its current level.
    pub fn stop(&mut self) {
        self.go_idle();
        self.handler = None;
    }

    /// Evaluates the sequence at the current time.
    ///
    /// Safe to call as often as the control loop likes: calls closer together
    /// than the minimum interval return [`PollOutcome::RateLimited`] without
    /// touching the line.
    pub fn poll(&mut self) -> PollOutcome {
        let now = self.clock.now_millis();
        if let Some(last) = self.last_poll
            && now.wrapping_sub(last) < self.config.min_interval_ms
        {
            return PollOutcome::RateLimited;
        }
        self.last_poll = Some(now);

        let (Some(pin), Some(started_at)) = (self.pin, self.started_at) else {
            return PollOutcome::Idle;
        };
        if self.pattern.is_idle() {
            return PollOutcome::Idle;
        }

        let elapsed = now.wrapping_sub(started_at);
        match self.pattern.position(elapsed) {
            PatternPosition::Finished => {
                self.go_idle();
                if let Some(handler) = self.handler.take() {
                    handler.on_complete();
                }
                PollOutcome::Completed
            }
            PatternPosition::Level(level) => {
                self.driver.write(pin, level);
                let edge = self.last_level != Some(level);
                self.last_level = Some(level);
                PollOutcome::Driven { level, edge }
            }
        }
    }

    fn go_idle(&mut self) {
        self.pattern = BlinkPattern::IDLE;
        self.started_at = None;
    }

    /// Whether a sequence is currently scheduled.
    pub fn state(&self) -> TimerState {
        if self.pattern.is_idle() || self.started_at.is_none() {
            TimerState::Idle
        } else {
            TimerState::Running
        }
    }

    /// Normalized pattern of the active sequence ([`BlinkPattern::IDLE`] when idle).
    pub fn pattern(&self) -> BlinkPattern {
        self.pattern
    }

    /// Line currently bound, if any.
    pub fn pin(&self) -> Option<P::Pin> {
        self.pin
    }

    /// Level most recently written by this timer.
    pub fn last_level(&self) -> Option<Level> {
        self.last_level
    }

    /// Time since the active sequence started.
    pub fn elapsed(&self) -> Option<Millis> {
        match self.state() {
            TimerState::Running => self
                .started_at
                .map(|started| self.clock.now_millis().wrapping_sub(started)),
            TimerState::Idle => None,
        }
    }

    pub fn config(&self) -> SequencerConfig {
        self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn driver(&self) -> &P {
        &self.driver
    }
}
