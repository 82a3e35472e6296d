#![no_std]

#[cfg(feature = "alloc")]
extern crate alloc;

// Shared logic for the LED blinker feature set.
//
// The pulse arithmetic, the polling timer, and the console surface live here
// so the MCU firmware and the host emulator drive the LED through exactly the
// same code. Nothing in this crate touches the Rust standard library.

pub mod controller;
pub mod pattern;
pub mod pin;
pub mod repl;
pub mod sequencer;
pub mod telemetry;
pub mod timing;
