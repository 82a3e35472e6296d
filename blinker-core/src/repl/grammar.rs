//! Line grammar for the LED console.
//!
//! ```text
//! on | off | stop | status | help [topic]
//! on-for <duration> | off-for <duration>
//! blink default
//! blink <on> <off> <count> <pause> [repeats]
//! show <number>
//! ```
//!
//! Durations are plain milliseconds or carry an `ms` / `s` suffix. Keywords
//! match case-insensitively. Token-level parsing uses `winnow` combinators
//! over the borrowed line, so nothing is allocated.

use core::fmt;
use core::str::FromStr;

use winnow::ascii::{digit1, multispace0};
use winnow::combinator::{alt, opt, preceded};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::take_till;

use crate::controller::LedCommand;
use crate::pattern::BlinkPattern;
use crate::timing::Millis;

/// Structured commands produced by the parser.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Command<'a> {
    Led(LedCommand),
    Status,
    Help(Option<&'a str>),
}

/// Errors produced while parsing a console line.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ParseError<'a> {
    /// The line held nothing but whitespace.
    Empty,
    UnknownCommand(&'a str),
    MissingArgument {
        expected: &'static str,
    },
    InvalidArgument {
        expected: &'static str,
        found: &'a str,
    },
    /// Tokens left over after a complete command.
    UnexpectedInput(&'a str),
}

impl fmt::Display for ParseError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Empty => f.write_str("empty command"),
            ParseError::UnknownCommand(word) => write!(f, "unknown command `{word}`"),
            ParseError::MissingArgument { expected } => write!(f, "missing {expected}"),
            ParseError::InvalidArgument { expected, found } => {
                write!(f, "expected {expected}, found `{found}`")
            }
            ParseError::UnexpectedInput(rest) => write!(f, "unexpected input `{rest}`"),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Keyword {
    On,
    Off,
    OnFor,
    OffFor,
    Blink,
    Show,
    Stop,
    Status,
    Help,
}

const KEYWORDS: [(&str, Keyword); 9] = [
    ("on", Keyword::On),
    ("off", Keyword::Off),
    ("on-for", Keyword::OnFor),
    ("off-for", Keyword::OffFor),
    ("blink", Keyword::Blink),
    ("show", Keyword::Show),
    ("stop", Keyword::Stop),
    ("status", Keyword::Status),
    ("help", Keyword::Help),
];

fn keyword(word: &str) -> Option<Keyword> {
    KEYWORDS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(word))
        .map(|(_, keyword)| *keyword)
}

/// Parses one console line.
pub fn parse(line: &str) -> Result<Command<'_>, ParseError<'_>> {
    let mut input = line;
    let word = next_token(&mut input).ok_or(ParseError::Empty)?;
    let Some(keyword) = keyword(word) else {
        return Err(ParseError::UnknownCommand(word));
    };

    let command = match keyword {
        Keyword::On => Command::Led(LedCommand::On),
        Keyword::Off => Command::Led(LedCommand::Off),
        Keyword::Stop => Command::Led(LedCommand::Stop),
        Keyword::Status => Command::Status,
        Keyword::Help => Command::Help(next_token(&mut input)),
        Keyword::OnFor => {
            Command::Led(LedCommand::OnFor(argument(&mut input, "duration", duration_ms)?))
        }
        Keyword::OffFor => {
            Command::Led(LedCommand::OffFor(argument(&mut input, "duration", duration_ms)?))
        }
        Keyword::Show => Command::Led(LedCommand::Show(argument(
            &mut input,
            "number",
            number::<u32>,
        )?)),
        Keyword::Blink => Command::Led(blink(&mut input)?),
    };

    let rest = input;
    match next_token(&mut input) {
        None => Ok(command),
        Some(_) => Err(ParseError::UnexpectedInput(rest.trim())),
    }
}

/// Parses a duration literal such as `250`, `250ms`, or `2s` into milliseconds.
pub fn parse_duration(token: &str) -> Result<Millis, ParseError<'_>> {
    convert(token, "duration", duration_ms)
}

fn blink<'a>(input: &mut &'a str) -> Result<LedCommand, ParseError<'a>> {
    let mut lookahead = *input;
    if next_token(&mut lookahead).is_some_and(|word| word.eq_ignore_ascii_case("default")) {
        *input = lookahead;
        return Ok(LedCommand::DefaultBlink);
    }

    let on_ms = argument(input, "on duration", duration_ms)?;
    let off_ms = argument(input, "off duration", duration_ms)?;
    let blinks = argument(input, "blink count (0-255)", number::<u8>)?;
    let pause_ms = argument(input, "pause duration", duration_ms)?;
    let repeats = match next_token(input) {
        Some(token) => convert(token, "repeat count (0-65535)", number::<u16>)?,
        None => 0,
    };

    Ok(LedCommand::Blink(BlinkPattern::new(
        on_ms, off_ms, blinks, pause_ms, repeats,
    )))
}

fn argument<'a, O>(
    input: &mut &'a str,
    expected: &'static str,
    parser: impl Parser<&'a str, O, ErrMode<ContextError>>,
) -> Result<O, ParseError<'a>> {
    let token = next_token(input).ok_or(ParseError::MissingArgument { expected })?;
    convert(token, expected, parser)
}

fn convert<'a, O>(
    token: &'a str,
    expected: &'static str,
    mut parser: impl Parser<&'a str, O, ErrMode<ContextError>>,
) -> Result<O, ParseError<'a>> {
    parser
        .parse(token)
        .map_err(|_| ParseError::InvalidArgument {
            expected,
            found: token,
        })
}

fn next_token<'a>(input: &mut &'a str) -> Option<&'a str> {
    let mut cursor = *input;
    let token = token(&mut cursor).ok()?;
    *input = cursor;
    Some(token)
}

fn token<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    preceded(multispace0, take_till(1.., char::is_whitespace)).parse_next(input)
}

fn number<T: FromStr>(input: &mut &str) -> ModalResult<T> {
    digit1.parse_to().parse_next(input)
}

fn duration_ms(input: &mut &str) -> ModalResult<Millis> {
    (
        digit1.parse_to::<u64>(),
        opt(alt(("ms".value(1_u64), "s".value(1_000_u64)))),
    )
        .verify_map(|(value, scale)| {
            value
                .checked_mul(scale.unwrap_or(1))
                .and_then(|ms| Millis::try_from(ms).ok())
        })
        .parse_next(input)
}
