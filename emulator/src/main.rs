mod session;

use std::env;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::process;

use blinker_core::repl::grammar::parse_duration;
use blinker_core::timing::{Millis, SequencerConfig};
use session::{Session, SessionOptions};

const USAGE: &str = "Usage: blinker-emulator [--tick <duration>] [--interval <duration>] \
                     [--transcript <path>] [--no-color]";

fn main() -> io::Result<()> {
    let mut options = parse_options(env::args().skip(1)).unwrap_or_else(|err| {
        eprintln!("{err}");
        eprintln!("{USAGE}");
        process::exit(2);
    });

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let stdout = io::stdout();
    options.color = options.color && stdout.is_terminal();
    let mut writer = stdout.lock();
    let mut session = Session::new(options)?;
    let mut line = String::new();

    writeln!(
        writer,
        "LED blinker emulator ready. Type `help` for commands, `wait <duration>` to let \
         time pass, or `exit` to quit."
    )?;

    loop {
        line.clear();
        write!(writer, "> ")?;
        writer.flush()?;

        let bytes_read = reader.read_line(&mut line)?;
        if bytes_read == 0 {
            writeln!(writer)?;
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if should_terminate(trimmed) {
            writeln!(writer, "Session closed.")?;
            break;
        }

        let responses = session.handle_command(trimmed)?;
        for response in responses {
            writeln!(writer, "{response}")?;
        }
    }

    Ok(())
}

fn should_terminate(input: &str) -> bool {
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<SessionOptions, String> {
    let mut options = SessionOptions {
        color: true,
        ..SessionOptions::default()
    };

    while let Some(arg) = args.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) => (flag.to_string(), Some(value.to_string())),
            None => (arg, None),
        };

        match flag.as_str() {
            "--no-color" => options.color = false,
            "--tick" => options.tick_ms = duration_arg(&flag, inline, &mut args)?,
            "--interval" => {
                let interval = duration_arg(&flag, inline, &mut args)?;
                options.config = SequencerConfig::with_min_interval(interval);
            }
            "--transcript" => {
                let path = inline
                    .or_else(|| args.next())
                    .ok_or_else(|| format!("Expected value after {flag}"))?;
                options.transcript = Some(PathBuf::from(path));
            }
            other => return Err(format!("Unknown argument `{other}`")),
        }
    }

    Ok(options)
}

fn duration_arg(
    flag: &str,
    inline: Option<String>,
    args: &mut impl Iterator<Item = String>,
) -> Result<Millis, String> {
    let value = inline
        .or_else(|| args.next())
        .ok_or_else(|| format!("Expected value after {flag}"))?;
    parse_duration(&value).map_err(|err| format!("Invalid {flag}: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(ToString::to_string).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn defaults_enable_color() {
        let options = parse_options(args(&[])).expect("defaults");
        assert!(options.color);
        assert_eq!(options.tick_ms, session::DEFAULT_TICK_MS);
        assert_eq!(options.config, SequencerConfig::DEFAULT);
    }

    #[test]
    fn flags_accept_split_and_inline_values() {
        let options = parse_options(args(&["--tick", "5", "--interval=1ms", "--no-color"]))
            .expect("flags");
        assert_eq!(options.tick_ms, 5);
        assert_eq!(options.config.min_interval_ms, 1);
        assert!(!options.color);
    }

    #[test]
    fn bad_arguments_are_reported() {
        assert_eq!(
            parse_options(args(&["--tick"])),
            Err("Expected value after --tick".to_string())
        );
        assert_eq!(
            parse_options(args(&["--tick", "fast"])),
            Err("Invalid --tick: expected duration, found `fast`".to_string())
        );
        assert_eq!(
            parse_options(args(&["--verbose"])),
            Err("Unknown argument `--verbose`".to_string())
        );
    }
}
