use embassy_stm32 as hal;
use embassy_stm32::Peri;
use embassy_stm32::usart::{BufferedUart, Config as UartConfig, DataBits, Parity, StopBits};
use embassy_time::{Duration, Timer};
use embedded_io_async::{Read, Write};

use crate::console::{ConsoleSession, MAX_LINE_LEN};
use crate::leds::{LedCommandSender, QueuedLedSink};

const CONSOLE_UART_BUFFER_SIZE: usize = MAX_LINE_LEN * 2;
const CONSOLE_UART_BAUD: u32 = 115_200;
const PROMPT: &[u8] = b"> ";
const BANNER: &[u8] = b"\r\nled-blinker console. Type `help` for commands.\r\n";

static mut UART_TX_BUFFER: [u8; CONSOLE_UART_BUFFER_SIZE] = [0; CONSOLE_UART_BUFFER_SIZE];
static mut UART_RX_BUFFER: [u8; CONSOLE_UART_BUFFER_SIZE] = [0; CONSOLE_UART_BUFFER_SIZE];

embassy_stm32::bind_interrupts!(struct UartIrqs {
    USART3_4_5_6_LPUART1 => embassy_stm32::usart::BufferedInterruptHandler<hal::peripherals::USART5>;
});

#[embassy_executor::task]
pub async fn run(
    commands: LedCommandSender<'static>,
    usart: Peri<'static, hal::peripherals::USART5>,
    tx_pin: Peri<'static, hal::peripherals::PB0>,
    rx_pin: Peri<'static, hal::peripherals::PB1>,
) -> ! {
    let mut config = UartConfig::default();
    config.baudrate = CONSOLE_UART_BAUD;
    config.data_bits = DataBits::DataBits8;
    config.stop_bits = StopBits::STOP1;
    config.parity = Parity::ParityNone;

    let mut uart = unsafe {
        BufferedUart::new(
            usart,
            rx_pin,
            tx_pin,
            &mut UART_TX_BUFFER,
            &mut UART_RX_BUFFER,
            UartIrqs,
            config,
        )
        .expect("failed to initialize console UART")
    };

    let mut session = ConsoleSession::new(QueuedLedSink::new(commands));
    let mut ingress = [0u8; MAX_LINE_LEN];

    if uart.write_all(BANNER).await.is_err() || uart.write_all(PROMPT).await.is_err() {
        defmt::warn!("console: UART write error");
    }

    loop {
        let count = match uart.read(&mut ingress).await {
            Ok(count) => count,
            Err(_) => {
                defmt::warn!("console: UART read error");
                Timer::after(Duration::from_millis(5)).await;
                continue;
            }
        };

        for &byte in &ingress[..count] {
            let reply = match session.ingest(byte) {
                Ok(Some(reply)) => reply,
                Ok(None) => continue,
                Err(error) => {
                    defmt::warn!("console: {}", defmt::Display2Format(&error));
                    let mut line = crate::console::ReplyLine::new();
                    let _ = core::fmt::write(&mut line, format_args!("{error}"));
                    line
                }
            };

            let written = async {
                uart.write_all(b"\r\n").await?;
                uart.write_all(reply.as_bytes()).await?;
                uart.write_all(b"\r\n").await?;
                uart.write_all(PROMPT).await?;
                uart.flush().await
            };
            if written.await.is_err() {
                defmt::warn!("console: UART write error");
                Timer::after(Duration::from_millis(5)).await;
            }
        }
    }
}
