use cortex_m::interrupt;
use cortex_m::register::primask;
use critical_section::{self, RawRestoreState};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_stm32 as hal;
use embassy_stm32::gpio::{Level, Output, Speed};
use embassy_sync::channel::Channel;

use crate::hw::BoardLed;
use crate::leds::LedCommandQueue;

mod console_task;
mod led_task;

critical_section::set_impl!(InterruptCriticalSection);

struct InterruptCriticalSection;

unsafe impl critical_section::Impl for InterruptCriticalSection {
    unsafe fn acquire() -> RawRestoreState {
        let primask = primask::read();
        interrupt::disable();
        primask.is_active()
    }

    unsafe fn release(restore_state: RawRestoreState) {
        if restore_state {
            unsafe {
                interrupt::enable();
            }
        }
    }
}

pub(super) static LED_COMMANDS: LedCommandQueue = Channel::new();

#[embassy_executor::main]
pub async fn main(spawner: Spawner) {
    let config = hal::Config::default();
    let hal::Peripherals {
        PA5, PB0, PB1, USART5, ..
    } = hal::init(config);

    let led = BoardLed::new(Output::new(PA5, Level::Low, Speed::Low));
    defmt::info!("led-blinker: peripherals ready");

    spawner
        .spawn(led_task::run(led, LED_COMMANDS.receiver()))
        .expect("failed to spawn LED task");

    spawner
        .spawn(console_task::run(LED_COMMANDS.sender(), USART5, PB0, PB1))
        .expect("failed to spawn console task");

    core::future::pending::<()>().await;
}
