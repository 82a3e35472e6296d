//! Console command dispatcher.
//!
//! Glues parsed grammar output to whatever owns the LED. The firmware hands
//! commands to a channel feeding the LED task, while the emulator and the
//! tests apply them to a [`LedController`] directly; both sit behind
//! [`LedCommandSink`].

use core::convert::Infallible;
use core::fmt;

use crate::controller::{LedCommand, LedController};
use crate::pin::PinDriver;
use crate::timing::MonotonicClock;

use super::grammar::{self, Command};
use super::status::StatusSnapshot;

/// One entry of the `help` listing.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct HelpTopic {
    pub name: &'static str,
    pub usage: &'static str,
    pub summary: &'static str,
}

pub const HELP_TOPICS: &[HelpTopic] = &[
    HelpTopic {
        name: "on",
        usage: "on",
        summary: "hold the LED on",
    },
    HelpTopic {
        name: "off",
        usage: "off",
        summary: "hold the LED off",
    },
    HelpTopic {
        name: "on-for",
        usage: "on-for <duration>",
        summary: "turn the LED on, then go idle after the duration",
    },
    HelpTopic {
        name: "off-for",
        usage: "off-for <duration>",
        summary: "turn the LED off, then go idle after the duration",
    },
    HelpTopic {
        name: "blink",
        usage: "blink <on> <off> <count> <pause> [repeats] | blink default",
        summary: "run a blink pattern; repeats of 0 or omitted runs forever",
    },
    HelpTopic {
        name: "show",
        usage: "show <number>",
        summary: "blink the decimal digits of a number, repeating",
    },
    HelpTopic {
        name: "stop",
        usage: "stop",
        summary: "abandon the active pattern, leaving the LED as it is",
    },
    HelpTopic {
        name: "status",
        usage: "status",
        summary: "report timer state, level and pattern",
    },
    HelpTopic {
        name: "help",
        usage: "help [topic]",
        summary: "list commands or describe one",
    },
];

/// Looks up a help entry by command name, ignoring ASCII case.
pub fn help_topic(name: &str) -> Option<&'static HelpTopic> {
    HELP_TOPICS
        .iter()
        .find(|topic| topic.name.eq_ignore_ascii_case(name))
}

/// Receiver for LED commands coming from the console.
pub trait LedCommandSink {
    type Error;

    fn submit(&mut self, command: LedCommand) -> Result<(), Self::Error>;

    fn status(&self) -> StatusSnapshot;
}

impl<P, C> LedCommandSink for LedController<P, C>
where
    P: PinDriver,
    C: MonotonicClock,
{
    type Error = Infallible;

    fn submit(&mut self, command: LedCommand) -> Result<(), Self::Error> {
        self.apply(command);
        Ok(())
    }

    fn status(&self) -> StatusSnapshot {
        LedController::status(self)
    }
}

/// Successful replies to a console line.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Response {
    Accepted(LedCommand),
    Status(StatusSnapshot),
    /// `None` lists every command.
    Help(Option<&'static HelpTopic>),
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Accepted(command) => write!(f, "ok {command}"),
            Response::Status(snapshot) => write!(f, "{snapshot}"),
            Response::Help(Some(topic)) => write!(f, "{}  {}", topic.usage, topic.summary),
            Response::Help(None) => {
                f.write_str("commands:")?;
                for topic in HELP_TOPICS {
                    write!(f, " {}", topic.name)?;
                }
                Ok(())
            }
        }
    }
}

/// Errors surfaced while executing a console line.
#[derive(Debug, Eq, PartialEq)]
pub enum CommandError<'a, E> {
    Parse(grammar::ParseError<'a>),
    UnknownTopic(&'a str),
    Sink(E),
}

impl<'a, E> From<grammar::ParseError<'a>> for CommandError<'a, E> {
    fn from(error: grammar::ParseError<'a>) -> Self {
        Self::Parse(error)
    }
}

impl<E> fmt::Display for CommandError<'_, E>
where
    E: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Parse(error) => write!(f, "error: {error}"),
            CommandError::UnknownTopic(topic) => write!(f, "error: no help for `{topic}`"),
            CommandError::Sink(error) => write!(f, "error: {error}"),
        }
    }
}

/// Dispatches console lines into a [`LedCommandSink`].
pub struct CommandExecutor<S> {
    sink: S,
}

impl<S> CommandExecutor<S> {
    pub const fn new(sink: S) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consumes the executor and yields the inner sink.
    pub fn into_inner(self) -> S {
        self.sink
    }
}

impl<S> CommandExecutor<S>
where
    S: LedCommandSink,
{
    /// Parses and executes one console line.
    pub fn execute<'a>(&mut self, line: &'a str) -> Result<Response, CommandError<'a, S::Error>> {
        match grammar::parse(line)? {
            Command::Led(command) => {
                self.sink.submit(command).map_err(CommandError::Sink)?;
                Ok(Response::Accepted(command))
            }
            Command::Status => Ok(Response::Status(self.sink.status())),
            Command::Help(None) => Ok(Response::Help(None)),
            Command::Help(Some(name)) => help_topic(name)
                .map(|topic| Response::Help(Some(topic)))
                .ok_or(CommandError::UnknownTopic(name)),
        }
    }
}
