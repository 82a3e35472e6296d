use blinker_core::controller::{LedCommand, LedController};
use blinker_core::sequencer::SequenceTimer;
use blinker_core::timing::SequencerConfig;
use embassy_futures::select::{Either, select};
use embassy_time::{Duration, Ticker};

use crate::hw::{BoardLed, EmbassyClock, LedLine};
use crate::leds::LedCommandReceiver;
use crate::{status, telemetry};

/// Pattern shown from power-up until the console asks for something else.
const BOOT_COMMAND: LedCommand = LedCommand::DefaultBlink;

#[embassy_executor::task]
pub async fn run(led: BoardLed<'static>, commands: LedCommandReceiver<'static>) -> ! {
    let config = SequencerConfig::DEFAULT;
    let timer = SequenceTimer::with_config(led, EmbassyClock, config);
    let mut controller = LedController::new(timer);
    controller.assign_pin(LedLine::User);
    controller.apply(BOOT_COMMAND);

    let mut ticker = Ticker::every(Duration::from_millis(u64::from(config.min_interval_ms)));
    let mut cursor = None;

    loop {
        match select(ticker.next(), commands.receive()).await {
            Either::First(()) => {
                controller.poll();
            }
            Either::Second(command) => {
                telemetry::log_command(&command);
                controller.apply(command);
                // Align the next tick with the start poll `apply` just made,
                // otherwise it is likely to land inside the rate limit.
                ticker.reset();
            }
        }

        cursor = telemetry::mirror(controller.telemetry(), cursor);
        status::publish(&controller.status());
    }
}
