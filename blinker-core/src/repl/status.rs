//! Shared status surface for the console.
//!
//! Both front-ends answer the `status` command with a [`StatusSnapshot`], and
//! its `Display` impl keeps the rendering identical on the UART console and
//! in the emulator.

use core::fmt;

use crate::pattern::BlinkPattern;
use crate::pin::Level;
use crate::sequencer::TimerState;
use crate::timing::Millis;

/// Point-in-time view of an LED controller.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct StatusSnapshot {
    pub state: TimerState,
    /// Level last driven onto the line, if any.
    pub level: Option<Level>,
    /// Active (normalized) pattern; idle once a sequence completes.
    pub pattern: BlinkPattern,
    pub elapsed_ms: Option<Millis>,
    pub completions: u32,
    /// Number being shown by a digit readout, if one is active.
    pub readout: Option<u32>,
}

impl StatusSnapshot {
    /// Snapshot of a controller that has never run anything.
    pub const IDLE: Self = Self {
        state: TimerState::Idle,
        level: None,
        pattern: BlinkPattern::IDLE,
        elapsed_ms: None,
        completions: 0,
        readout: None,
    };
}

impl Default for StatusSnapshot {
    fn default() -> Self {
        Self::IDLE
    }
}

impl fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "state={}", self.state.label())?;
        match self.level {
            Some(level) => write!(f, " level={level}")?,
            None => f.write_str(" level=unknown")?,
        }
        match self.elapsed_ms {
            Some(elapsed) => write!(f, " elapsed={elapsed}ms")?,
            None => f.write_str(" elapsed=-")?,
        }
        write!(f, " completions={}", self.completions)?;
        if let Some(value) = self.readout {
            write!(f, " readout={value}")?;
        }
        write!(f, " pattern=[{}]", self.pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::String;

    fn render(snapshot: &StatusSnapshot) -> String<160> {
        let mut out = String::new();
        fmt::write(&mut out, format_args!("{snapshot}")).unwrap();
        out
    }

    #[test]
    fn idle_snapshot_renders_placeholders() {
        assert_eq!(
            render(&StatusSnapshot::IDLE).as_str(),
            "state=idle level=unknown elapsed=- completions=0 pattern=[idle]"
        );
    }

    #[test]
    fn running_snapshot_includes_readout() {
        let snapshot = StatusSnapshot {
            state: TimerState::Running,
            level: Some(Level::High),
            pattern: BlinkPattern::new(200, 200, 2, 700, 1),
            elapsed_ms: Some(120),
            completions: 3,
            readout: Some(25),
        };
        assert_eq!(
            render(&snapshot).as_str(),
            "state=running level=high elapsed=120ms completions=3 readout=25 \
             pattern=[on=200ms off=200ms blinks=2 pause=700ms repeats=1]"
        );
    }
}
