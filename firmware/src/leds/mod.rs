//! LED command plumbing between the console and the LED task.

#![cfg_attr(not(target_os = "none"), allow(dead_code))]

use core::fmt;

use blinker_core::controller::LedCommand;
use blinker_core::repl::commands::LedCommandSink;
use blinker_core::repl::status::StatusSnapshot;
#[cfg(not(target_os = "none"))]
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
#[cfg(target_os = "none")]
use embassy_sync::blocking_mutex::raw::ThreadModeRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender, TrySendError};

use crate::status;

/// Depth of the command queue feeding the LED task.
pub const LED_COMMAND_QUEUE_DEPTH: usize = 4;

#[cfg(target_os = "none")]
type LedMutex = ThreadModeRawMutex;
#[cfg(not(target_os = "none"))]
type LedMutex = NoopRawMutex;

/// Queue carrying console requests to the LED task.
pub type LedCommandQueue = Channel<LedMutex, LedCommand, LED_COMMAND_QUEUE_DEPTH>;

pub type LedCommandSender<'a> = Sender<'a, LedMutex, LedCommand, LED_COMMAND_QUEUE_DEPTH>;

pub type LedCommandReceiver<'a> = Receiver<'a, LedMutex, LedCommand, LED_COMMAND_QUEUE_DEPTH>;

/// Errors raised when handing a command to the LED task.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LedQueueError {
    /// The LED task has not drained earlier commands yet.
    QueueFull,
}

impl fmt::Display for LedQueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedQueueError::QueueFull => f.write_str("LED busy, command queue full"),
        }
    }
}

/// Console-side sink: commands go onto the queue, status comes from the
/// snapshot the LED task last published.
pub struct QueuedLedSink<'a> {
    sender: LedCommandSender<'a>,
}

impl<'a> QueuedLedSink<'a> {
    pub fn new(sender: LedCommandSender<'a>) -> Self {
        Self { sender }
    }
}

impl LedCommandSink for QueuedLedSink<'_> {
    type Error = LedQueueError;

    fn submit(&mut self, command: LedCommand) -> Result<(), Self::Error> {
        self.sender
            .try_send(command)
            .map_err(|_: TrySendError<LedCommand>| LedQueueError::QueueFull)
    }

    fn status(&self) -> StatusSnapshot {
        status::snapshot()
    }
}
