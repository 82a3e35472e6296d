//! Console tooling shared between firmware and emulator targets.
//!
//! The line grammar lives in [`grammar`], [`commands`] turns parsed lines into
//! controller requests, and [`status`] renders the `status` reply.

pub mod commands;
pub mod grammar;
pub mod status;
