//! Logging hooks for LED telemetry.
//!
//! The controller keeps its own event ring; this module mirrors records the
//! firmware has not logged yet to defmt (or stdout on host builds) so edges
//! and completions show up in the RTT stream during bring-up.

#![cfg_attr(not(target_os = "none"), allow(dead_code))]

use blinker_core::controller::LedCommand;
use blinker_core::telemetry::{EventId, TelemetryRecord, TelemetryRecorder};

/// Logs every record newer than `cursor` and returns the new cursor.
pub fn mirror(recorder: &TelemetryRecorder, cursor: Option<EventId>) -> Option<EventId> {
    let mut latest = cursor;
    for record in recorder.since(cursor) {
        emit_record(record);
        latest = Some(record.id);
    }
    latest
}

/// Logs a console request as it reaches the LED task.
pub fn log_command(command: &LedCommand) {
    emit_command(command);
}

#[cfg(target_os = "none")]
fn emit_record(record: &TelemetryRecord) {
    defmt::info!(
        "telemetry:led code={=u16:#06x} {}",
        record.event.to_raw(),
        defmt::Display2Format(record)
    );
}

#[cfg(not(target_os = "none"))]
fn emit_record(record: &TelemetryRecord) {
    println!(
        "telemetry:led code={:#06x} {record}",
        record.event.to_raw()
    );
}

#[cfg(target_os = "none")]
fn emit_command(command: &LedCommand) {
    defmt::info!("led: command {}", defmt::Display2Format(command));
}

#[cfg(not(target_os = "none"))]
fn emit_command(command: &LedCommand) {
    println!("led: command {command}");
}
