#![cfg_attr(not(target_os = "none"), allow(dead_code))]

//! Shared status storage for the firmware target.
//!
//! The LED task publishes its [`StatusSnapshot`] into atomics after every
//! loop iteration, and the console task reads it back for `status` without
//! touching the controller. Elapsed time is therefore as fresh as the last
//! tick, which is at most one poll interval old.

use blinker_core::pattern::BlinkPattern;
use blinker_core::pin::Level;
use blinker_core::repl::status::StatusSnapshot;
use blinker_core::sequencer::TimerState;
use blinker_core::timing::Millis;
use portable_atomic::{AtomicBool, AtomicU8, AtomicU16, AtomicU32, Ordering};

const LEVEL_UNKNOWN: u8 = 0;
const LEVEL_LOW: u8 = 1;
const LEVEL_HIGH: u8 = 2;

static RUNNING: AtomicBool = AtomicBool::new(false);
static LEVEL: AtomicU8 = AtomicU8::new(LEVEL_UNKNOWN);
/// Elapsed milliseconds, +1 (0 == no active sequence).
static ELAPSED_MS: AtomicU32 = AtomicU32::new(0);
static COMPLETIONS: AtomicU32 = AtomicU32::new(0);
static READOUT_ACTIVE: AtomicBool = AtomicBool::new(false);
static READOUT_VALUE: AtomicU32 = AtomicU32::new(0);

static PATTERN_ON_MS: AtomicU32 = AtomicU32::new(0);
static PATTERN_OFF_MS: AtomicU32 = AtomicU32::new(0);
static PATTERN_BLINKS: AtomicU8 = AtomicU8::new(0);
static PATTERN_PAUSE_MS: AtomicU32 = AtomicU32::new(0);
static PATTERN_REPEATS: AtomicU16 = AtomicU16::new(0);

fn encode_elapsed(elapsed: Option<Millis>) -> u32 {
    // Saturate instead of wrapping into the "none" marker.
    elapsed.map_or(0, |ms| ms.saturating_add(1))
}

fn decode_elapsed(raw: u32) -> Option<Millis> {
    if raw == 0 { None } else { Some(raw - 1) }
}

fn encode_level(level: Option<Level>) -> u8 {
    match level {
        None => LEVEL_UNKNOWN,
        Some(Level::Low) => LEVEL_LOW,
        Some(Level::High) => LEVEL_HIGH,
    }
}

fn decode_level(raw: u8) -> Option<Level> {
    match raw {
        LEVEL_LOW => Some(Level::Low),
        LEVEL_HIGH => Some(Level::High),
        _ => None,
    }
}

/// Stores `snapshot` for readers on other tasks.
pub fn publish(snapshot: &StatusSnapshot) {
    RUNNING.store(snapshot.state == TimerState::Running, Ordering::Relaxed);
    LEVEL.store(encode_level(snapshot.level), Ordering::Relaxed);
    ELAPSED_MS.store(encode_elapsed(snapshot.elapsed_ms), Ordering::Relaxed);
    COMPLETIONS.store(snapshot.completions, Ordering::Relaxed);
    READOUT_ACTIVE.store(snapshot.readout.is_some(), Ordering::Relaxed);
    READOUT_VALUE.store(snapshot.readout.unwrap_or(0), Ordering::Relaxed);

    let pattern = snapshot.pattern;
    PATTERN_ON_MS.store(pattern.on_ms, Ordering::Relaxed);
    PATTERN_OFF_MS.store(pattern.off_ms, Ordering::Relaxed);
    PATTERN_BLINKS.store(pattern.blinks, Ordering::Relaxed);
    PATTERN_PAUSE_MS.store(pattern.pause_ms, Ordering::Relaxed);
    PATTERN_REPEATS.store(pattern.repeats, Ordering::Relaxed);
}

/// Rebuilds the most recently published [`StatusSnapshot`].
pub fn snapshot() -> StatusSnapshot {
    let state = if RUNNING.load(Ordering::Relaxed) {
        TimerState::Running
    } else {
        TimerState::Idle
    };
    let readout = READOUT_ACTIVE
        .load(Ordering::Relaxed)
        .then(|| READOUT_VALUE.load(Ordering::Relaxed));

    StatusSnapshot {
        state,
        level: decode_level(LEVEL.load(Ordering::Relaxed)),
        pattern: BlinkPattern::new(
            PATTERN_ON_MS.load(Ordering::Relaxed),
            PATTERN_OFF_MS.load(Ordering::Relaxed),
            PATTERN_BLINKS.load(Ordering::Relaxed),
            PATTERN_PAUSE_MS.load(Ordering::Relaxed),
            PATTERN_REPEATS.load(Ordering::Relaxed),
        ),
        elapsed_ms: decode_elapsed(ELAPSED_MS.load(Ordering::Relaxed)),
        completions: COMPLETIONS.load(Ordering::Relaxed),
        readout,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn published_snapshot_reads_back() {
        assert_eq!(snapshot(), StatusSnapshot::IDLE);

        let running = StatusSnapshot {
            state: TimerState::Running,
            level: Some(Level::Low),
            pattern: BlinkPattern::new(200, 200, 3, 700, 1),
            elapsed_ms: Some(0),
            completions: 7,
            readout: Some(0),
        };
        publish(&running);
        assert_eq!(snapshot(), running);

        publish(&StatusSnapshot::IDLE);
        assert_eq!(snapshot(), StatusSnapshot::IDLE);
    }

    #[test]
    fn elapsed_encoding_reserves_zero() {
        assert_eq!(decode_elapsed(encode_elapsed(None)), None);
        assert_eq!(decode_elapsed(encode_elapsed(Some(0))), Some(0));
        assert_eq!(
            decode_elapsed(encode_elapsed(Some(u32::MAX))),
            Some(u32::MAX - 1)
        );
    }
}
