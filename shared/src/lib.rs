//! Shared types for the emulator test harness
//!
//! Contains the trace segment document model, identifier generation and the
//! emulator endpoint tables used by both the trace daemon and the harness.

pub mod errors;
pub mod logging;
pub mod types;

pub use errors::*;
pub use types::*;
