use core::cell::Cell;

use blinker_core::pin::{Level, RecordingPinDriver};
use blinker_core::sequencer::{PollOutcome, SequenceTimer, TimerState};
use blinker_core::timing::{ManualClock, Millis, SequencerConfig};

const LED: u8 = 13;

fn level_at<H>(
    timer: &mut SequenceTimer<RecordingPinDriver<64>, &ManualClock, H>,
    clock: &ManualClock,
    base: Millis,
    offset: Millis,
) -> PollOutcome
where
    H: blinker_core::sequencer::CompletionHandler,
{
    clock.set(base.wrapping_add(offset));
    timer.poll()
}

#[test]
fn two_blinks_with_pause_run_twice_then_complete() {
    let fired = Cell::new(0_u32);
    let clock = ManualClock::new(10_000);
    let mut timer = SequenceTimer::with_pin(RecordingPinDriver::<64>::new(), &clock, LED);

    let first = timer.start_with(200, 300, 2, 700, 2, Some(|| fired.set(fired.get() + 1)));
    assert_eq!(first.level(), Some(Level::High));

    let expected = [
        (250, Level::Low),
        (500, Level::High),
        (750, Level::Low),
        (1_000, Level::Low),
        (1_350, Level::Low),
        (1_400, Level::High),
        (1_650, Level::Low),
        (1_900, Level::High),
        (2_150, Level::Low),
        (2_750, Level::Low),
    ];
    for (offset, level) in expected {
        assert_eq!(
            level_at(&mut timer, &clock, 10_000, offset).level(),
            Some(level),
            "level at {offset}ms"
        );
    }
    assert_eq!(fired.get(), 0);

    assert_eq!(
        level_at(&mut timer, &clock, 10_000, 2_800),
        PollOutcome::Completed
    );
    assert_eq!(fired.get(), 1);
    assert_eq!(timer.state(), TimerState::Idle);

    let writes = timer.driver().write_count();
    for offset in [2_900, 5_000, 60_000] {
        assert_eq!(
            level_at(&mut timer, &clock, 10_000, offset),
            PollOutcome::Idle
        );
    }
    assert_eq!(timer.driver().write_count(), writes);
    assert_eq!(fired.get(), 1);
}

#[test]
fn high_exactly_on_ms_of_each_cycle() {
    let clock = ManualClock::new(0);
    let config = SequencerConfig::with_min_interval(1);
    let mut timer: SequenceTimer<_, _> =
        SequenceTimer::with_config(RecordingPinDriver::<64>::new(), &clock, config);
    timer.assign_pin(LED);

    // cycle 100, blink phase 300, repetition 300 + 200 - 70 = 430
    let first = timer.start_with(30, 70, 3, 200, 1, None);
    let mut high_ms = u32::from(first.level() == Some(Level::High));
    for t in 1..430 {
        clock.set(t);
        if timer.poll().level() == Some(Level::High) {
            high_ms += 1;
        }
    }
    assert_eq!(high_ms, 90);

    clock.set(430);
    assert_eq!(timer.poll(), PollOutcome::Completed);
}

#[test]
fn zero_on_and_off_is_forced_idle() {
    let fired = Cell::new(false);
    let clock = ManualClock::new(0);
    let mut timer = SequenceTimer::with_pin(RecordingPinDriver::<64>::new(), &clock, LED);

    assert_eq!(
        timer.start_with(0, 0, 3, 500, 2, Some(|| fired.set(true))),
        PollOutcome::Idle
    );
    for step in 1..=100 {
        clock.set(step * 50);
        assert_eq!(timer.poll(), PollOutcome::Idle);
    }

    assert_eq!(timer.driver().write_count(), 0);
    assert!(timer.pattern().is_idle());
    assert!(!fired.get());
}

#[test]
fn on_without_off_or_pause_holds_high_forever() {
    let fired = Cell::new(false);
    let clock = ManualClock::new(0);
    let mut timer = SequenceTimer::with_pin(RecordingPinDriver::<64>::new(), &clock, LED);

    timer.start_with(250, 0, 1, 0, 0, Some(|| fired.set(true)));
    for step in 1..=400 {
        clock.set(step * 25);
        assert_eq!(timer.poll().level(), Some(Level::High), "step {step}");
    }

    assert!(!fired.get());
    assert_eq!(timer.state(), TimerState::Running);
}

#[test]
fn endless_pattern_never_completes() {
    let fired = Cell::new(false);
    let clock = ManualClock::new(0);
    let mut timer = SequenceTimer::with_pin(RecordingPinDriver::<64>::new(), &clock, LED);

    timer.start_with(100, 100, 2, 300, 0, Some(|| fired.set(true)));
    for step in 1..=2_000 {
        clock.set(step * 20);
        assert_ne!(timer.poll(), PollOutcome::Completed);
    }
    assert!(!fired.get());
}

#[test]
fn polls_within_interval_change_nothing() {
    let clock = ManualClock::new(0);
    let mut timer: SequenceTimer<_, _> =
        SequenceTimer::with_pin(RecordingPinDriver::<64>::new(), &clock, LED);
    timer.start_with(200, 300, 2, 700, 2, None);

    clock.set(150);
    let evaluated = timer.poll();
    let writes = timer.driver().write_count();
    let elapsed = timer.elapsed();

    clock.set(165);
    assert_eq!(timer.poll(), PollOutcome::RateLimited);
    assert_eq!(timer.poll(), PollOutcome::RateLimited);

    assert_eq!(evaluated.level(), Some(Level::High));
    assert_eq!(timer.driver().write_count(), writes);
    assert_eq!(timer.driver().level(LED), Some(Level::High));
    assert_eq!(timer.elapsed(), elapsed.map(|ms| ms + 15));
}

#[test]
fn zero_off_time_keeps_line_high_through_blinks() {
    let clock = ManualClock::new(0);
    let mut timer: SequenceTimer<_, _> =
        SequenceTimer::with_pin(RecordingPinDriver::<64>::new(), &clock, LED);

    // cycle 100, blink phase 300, repetition 300 + 200 - 0 = 500
    timer.start_with(100, 0, 3, 200, 1, None);
    for (t, level) in [(50, Level::High), (150, Level::High), (299, Level::High)] {
        clock.set(t);
        assert_eq!(timer.poll().level(), Some(level), "at {t}ms");
    }
    clock.set(320);
    assert_eq!(timer.poll().level(), Some(Level::Low));
    clock.set(480);
    assert_eq!(timer.poll().level(), Some(Level::Low));
    clock.set(500);
    assert_eq!(timer.poll(), PollOutcome::Completed);
}

#[test]
fn zero_pause_runs_last_blink_into_next_repetition() {
    let clock = ManualClock::new(0);
    let mut timer: SequenceTimer<_, _> =
        SequenceTimer::with_pin(RecordingPinDriver::<64>::new(), &clock, LED);

    // cycle 100, blink phase 200, repetition 200 + 0 - 60 = 140
    timer.start_with(40, 60, 2, 0, 0, None);
    let samples = [
        (40, Level::Low),
        (100, Level::High),
        (120, Level::High),
        (140, Level::High),
        (180, Level::Low),
        (240, Level::High),
    ];
    for (t, level) in samples {
        clock.set(t);
        assert_eq!(timer.poll().level(), Some(level), "at {t}ms");
    }
}

#[test]
fn elapsed_time_survives_clock_wraparound() {
    let fired = Cell::new(0_u32);
    let base = u32::MAX - 100;
    let clock = ManualClock::new(base);
    let mut timer = SequenceTimer::with_pin(RecordingPinDriver::<64>::new(), &clock, LED);

    timer.on_for(300, Some(|| fired.set(fired.get() + 1)));
    assert_eq!(
        level_at(&mut timer, &clock, base, 150).level(),
        Some(Level::High)
    );
    assert_eq!(timer.elapsed(), Some(150));
    assert_eq!(
        level_at(&mut timer, &clock, base, 299).level(),
        Some(Level::High)
    );
    assert_eq!(
        level_at(&mut timer, &clock, base, 320),
        PollOutcome::Completed
    );
    assert_eq!(fired.get(), 1);
}

#[test]
fn restart_replaces_pattern_and_handler() {
    let first = Cell::new(false);
    let second = Cell::new(false);
    let mark_first = || first.set(true);
    let mark_second = || second.set(true);
    let clock = ManualClock::new(0);
    let mut timer: SequenceTimer<_, _, &dyn Fn()> =
        SequenceTimer::with_pin(RecordingPinDriver::<64>::new(), &clock, LED);

    timer.on_for(100, Some(&mark_first));
    clock.set(60);
    timer.off_for(100, Some(&mark_second));

    assert_eq!(timer.driver().level(LED), Some(Level::Low));
    assert_eq!(timer.elapsed(), Some(0));

    clock.set(160);
    assert_eq!(timer.poll(), PollOutcome::Completed);
    assert!(!first.get());
    assert!(second.get());
}
