use blinker_core::controller::{LedCommand, LedController};
use blinker_core::pattern::BlinkPattern;
use blinker_core::pin::{Level, RecordingPinDriver};
use blinker_core::repl::commands::{CommandExecutor, Response};
use blinker_core::sequencer::{SequenceTimer, TimerState};
use blinker_core::telemetry::TelemetryEventKind;
use blinker_core::timing::{ManualClock, Millis, MonotonicClock};

const LED: u8 = 4;

type Controller<'c> = LedController<RecordingPinDriver<64>, &'c ManualClock>;

fn controller(clock: &ManualClock) -> Controller<'_> {
    let mut controller = LedController::new(SequenceTimer::new(RecordingPinDriver::new(), clock));
    controller.assign_pin(LED);
    controller
}

fn run_until(controller: &mut Controller<'_>, until: Millis) {
    while controller.clock().now_millis() < until {
        controller.clock().advance(10);
        controller.poll();
    }
}

fn edges(controller: &Controller<'_>, level: Level) -> heapless::Vec<Millis, 16> {
    controller
        .telemetry()
        .oldest_first()
        .filter(|record| record.event == TelemetryEventKind::LevelChanged(level))
        .map(|record| record.timestamp_ms)
        .collect()
}

#[test]
fn readout_shows_digits_then_gap_then_repeats() {
    let clock = ManualClock::new(0);
    let mut controller = controller(&clock);

    controller.apply(LedCommand::Show(20));
    run_until(&mut controller, 4_100);

    // "2": two 200 ms blinks, rest of the 1300 ms step dark.
    // "0": one 1000 ms blink, 700 ms dark.
    // Gap: 1000 ms dark, then "2" again.
    assert_eq!(edges(&controller, Level::High).as_slice(), &[0, 400, 1_300, 4_000]);
    assert_eq!(edges(&controller, Level::Low).as_slice(), &[200, 600, 2_300]);
    assert_eq!(controller.completions(), 3);
    assert_eq!(controller.status().readout, Some(20));
    assert_eq!(controller.status().state, TimerState::Running);
}

#[test]
fn finite_commands_go_idle_and_hold_last_level() {
    let clock = ManualClock::new(0);
    let mut controller = controller(&clock);

    controller.apply(LedCommand::OnFor(500));
    run_until(&mut controller, 600);

    assert_eq!(controller.status().state, TimerState::Idle);
    assert_eq!(controller.status().level, Some(Level::High));
    assert_eq!(controller.completions(), 1);

    controller.apply(LedCommand::OffFor(300));
    assert_eq!(controller.timer().driver().level(LED), Some(Level::Low));
    run_until(&mut controller, 1_000);
    assert_eq!(controller.completions(), 2);
}

#[test]
fn custom_blink_pattern_repeats_requested_times() {
    let clock = ManualClock::new(0);
    let mut controller = controller(&clock);

    controller.apply(LedCommand::Blink(BlinkPattern::new(100, 100, 3, 400, 2)));
    // repetition 600 + 400 - 100 = 900, two of them.
    run_until(&mut controller, 1_790);
    assert_eq!(controller.completions(), 0);
    run_until(&mut controller, 1_800);
    assert_eq!(controller.completions(), 1);
    assert_eq!(edges(&controller, Level::High).len(), 6);
}

#[test]
fn console_lines_drive_the_led() {
    let clock = ManualClock::new(0);
    let mut executor = CommandExecutor::new(controller(&clock));

    assert_eq!(
        executor.execute("blink 200 300 2 700 2"),
        Ok(Response::Accepted(LedCommand::Blink(BlinkPattern::new(
            200, 300, 2, 700, 2
        ))))
    );
    run_until(executor.sink_mut(), 2_800);

    let controller = executor.into_inner();
    assert_eq!(controller.completions(), 1);
    assert_eq!(edges(&controller, Level::High).as_slice(), &[0, 500, 1_400, 1_900]);
}
