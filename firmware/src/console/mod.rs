//! Line-oriented operator console.
//!
//! Bytes arrive one at a time from the UART task. The session assembles them
//! into a bounded line buffer, hands complete lines to the shared
//! [`CommandExecutor`], and renders the reply into a fixed-size string the
//! transport can write back verbatim.

#![cfg_attr(not(target_os = "none"), allow(dead_code))]

use core::fmt::{self, Write as _};
use core::str;

use blinker_core::repl::commands::{CommandExecutor, LedCommandSink};
use heapless::{String, Vec};

/// Maximum number of bytes accepted on a single console line (excluding terminator).
pub const MAX_LINE_LEN: usize = 96;

/// Capacity of a rendered reply; a full `status` line fits comfortably.
pub const MAX_REPLY_LEN: usize = 192;

pub type ReplyLine = String<MAX_REPLY_LEN>;

/// Errors surfaced by the console session.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConsoleError {
    /// Input exceeded [`MAX_LINE_LEN`]; the rest of the line is dropped.
    LineOverflow,
    /// Encountered non-UTF-8 data in the assembled line buffer.
    InvalidUtf8,
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleError::LineOverflow => {
                write!(f, "error: line longer than {MAX_LINE_LEN} bytes")
            }
            ConsoleError::InvalidUtf8 => f.write_str("error: line is not valid UTF-8"),
        }
    }
}

/// Console state for one transport.
pub struct ConsoleSession<S> {
    executor: CommandExecutor<S>,
    buffer: Vec<u8, MAX_LINE_LEN>,
    discarding: bool,
}

impl<S> ConsoleSession<S>
where
    S: LedCommandSink,
    S::Error: fmt::Display,
{
    pub fn new(sink: S) -> Self {
        Self {
            executor: CommandExecutor::new(sink),
            buffer: Vec::new(),
            discarding: false,
        }
    }

    /// Feeds a single byte. A line terminator runs the buffered command and
    /// yields its reply.
    pub fn ingest(&mut self, byte: u8) -> Result<Option<ReplyLine>, ConsoleError> {
        match byte {
            b'\r' | b'\n' => {
                if self.discarding {
                    self.discarding = false;
                    self.buffer.clear();
                    return Ok(None);
                }
                self.process_line()
            }
            0x08 | 0x7f => {
                self.buffer.pop();
                Ok(None)
            }
            _ if self.discarding => Ok(None),
            value => {
                if self.buffer.push(value).is_err() {
                    self.buffer.clear();
                    self.discarding = true;
                    return Err(ConsoleError::LineOverflow);
                }
                Ok(None)
            }
        }
    }

    fn process_line(&mut self) -> Result<Option<ReplyLine>, ConsoleError> {
        if self.buffer.is_empty() {
            return Ok(None);
        }

        let result = match str::from_utf8(self.buffer.as_slice()) {
            Ok(line) if line.trim().is_empty() => Ok(None),
            Ok(line) => {
                let mut reply = ReplyLine::new();
                // Overlong replies are truncated at capacity.
                let _ = match self.executor.execute(line) {
                    Ok(response) => write!(reply, "{response}"),
                    Err(error) => write!(reply, "{error}"),
                };
                Ok(Some(reply))
            }
            Err(_) => Err(ConsoleError::InvalidUtf8),
        };
        self.buffer.clear();
        result
    }

    pub fn sink(&self) -> &S {
        self.executor.sink()
    }
}
