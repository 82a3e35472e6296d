use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use blinker_core::controller::LedController;
use blinker_core::pin::{Level, RecordingPinDriver};
use blinker_core::repl::commands::CommandExecutor;
use blinker_core::repl::grammar::parse_duration;
use blinker_core::sequencer::SequenceTimer;
use blinker_core::telemetry::{EventId, TelemetryEventKind, TelemetryRecord};
use blinker_core::timing::{ManualClock, Millis, MonotonicClock, SequencerConfig};
use crossterm::style::Stylize;

/// Line the emulated LED is wired to.
pub const EMULATOR_LED_PIN: u8 = 13;

pub const DEFAULT_TICK_MS: Millis = 10;

type EmulatedController = LedController<RecordingPinDriver, ManualClock>;

/// Knobs taken from the command line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SessionOptions {
    /// Simulated time between two polls while `wait` runs.
    pub tick_ms: Millis,
    pub config: SequencerConfig,
    /// Style LED glyphs with terminal colors.
    pub color: bool,
    pub transcript: Option<PathBuf>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            tick_ms: DEFAULT_TICK_MS,
            config: SequencerConfig::DEFAULT,
            color: false,
            transcript: None,
        }
    }
}

pub struct Session {
    executor: CommandExecutor<EmulatedController>,
    tick_ms: Millis,
    color: bool,
    transcript: Option<TranscriptLogger>,
    last_event: Option<EventId>,
}

impl Session {
    pub fn new(options: SessionOptions) -> io::Result<Self> {
        let transcript = options
            .transcript
            .as_deref()
            .map(TranscriptLogger::new)
            .transpose()?;

        let timer = SequenceTimer::with_config(
            RecordingPinDriver::new(),
            ManualClock::new(0),
            options.config,
        );
        let mut controller = LedController::new(timer);
        controller.assign_pin(EMULATOR_LED_PIN);
        let last_event = controller.telemetry().latest().map(|record| record.id);

        Ok(Self {
            executor: CommandExecutor::new(controller),
            tick_ms: options.tick_ms.max(1),
            color: options.color,
            transcript,
            last_event,
        })
    }

    pub fn handle_command(&mut self, line: &str) -> io::Result<Vec<String>> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }

        let now = self.now();
        if let Some(transcript) = self.transcript.as_mut() {
            transcript.append_line(now, TranscriptRole::Host, trimmed)?;
        }

        let mut lines = Vec::new();
        let mut words = trimmed.split_whitespace();
        if words
            .next()
            .is_some_and(|word| word.eq_ignore_ascii_case("wait"))
        {
            match (words.next(), words.next()) {
                (None, _) => lines.push("error: missing duration".to_string()),
                (Some(_), Some(extra)) => {
                    lines.push(format!("error: unexpected input `{extra}`"));
                }
                (Some(token), None) => match parse_duration(token) {
                    Ok(duration) => self.advance(duration, &mut lines),
                    Err(err) => lines.push(format!("error: {err}")),
                },
            }
        } else {
            match self.executor.execute(trimmed) {
                Ok(response) => {
                    lines.push(response.to_string());
                    self.drain_events(&mut lines);
                }
                Err(err) => lines.push(err.to_string()),
            }
        }

        self.record_output(&lines)?;
        Ok(lines)
    }

    /// Simulated milliseconds since the session started.
    pub fn now(&self) -> Millis {
        self.executor.sink().clock().now_millis()
    }

    pub fn controller(&self) -> &EmulatedController {
        self.executor.sink()
    }

    fn advance(&mut self, duration: Millis, lines: &mut Vec<String>) {
        let mut remaining = duration;
        while remaining > 0 {
            let step = remaining.min(self.tick_ms);
            let controller = self.executor.sink_mut();
            controller.clock().advance(step);
            controller.poll();
            self.drain_events(lines);
            remaining -= step;
        }
        lines.push(format!("t={}ms", self.now()));
    }

    fn drain_events(&mut self, lines: &mut Vec<String>) {
        let telemetry = self.executor.sink().telemetry();
        for record in telemetry.since(self.last_event) {
            lines.push(describe_event(record, self.color));
            self.last_event = Some(record.id);
        }
    }

    fn record_output(&mut self, lines: &[String]) -> io::Result<()> {
        let now = self.now();
        if let Some(transcript) = self.transcript.as_mut() {
            for line in lines {
                transcript.append_line(now, TranscriptRole::Emulator, line)?;
            }
        }
        Ok(())
    }
}

fn describe_event(record: &TelemetryRecord, color: bool) -> String {
    match record.event {
        TelemetryEventKind::LevelChanged(level) => {
            let glyph = match (level, color) {
                (Level::High, true) => "●".yellow().bold().to_string(),
                (Level::Low, true) => "○".dark_grey().to_string(),
                (Level::High, false) => "●".to_string(),
                (Level::Low, false) => "○".to_string(),
            };
            format!("t={}ms led {glyph} {level}", record.timestamp_ms)
        }
        event => format!("t={}ms {event}", record.timestamp_ms),
    }
}

struct TranscriptLogger {
    writer: BufWriter<std::fs::File>,
}

impl TranscriptLogger {
    fn new(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        let mut logger = Self {
            writer: BufWriter::new(file),
        };

        logger.write_header()?;
        Ok(logger)
    }

    fn write_header(&mut self) -> io::Result<()> {
        writeln!(self.writer, "# LED blinker emulator transcript")?;
        writeln!(
            self.writer,
            "# Timestamps are simulated milliseconds since session start"
        )?;
        writeln!(self.writer)?;
        self.writer.flush()
    }

    fn append_line(&mut self, now: Millis, role: TranscriptRole, line: &str) -> io::Result<()> {
        writeln!(self.writer, "[+{now:>6} ms] {} {line}", role.prefix())?;
        self.writer.flush()
    }
}

enum TranscriptRole {
    Host,
    Emulator,
}

impl TranscriptRole {
    fn prefix(&self) -> &'static str {
        match self {
            TranscriptRole::Host => "HOST>",
            TranscriptRole::Emulator => "EMU <",
        }
    }
}
