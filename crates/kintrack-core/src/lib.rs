//! kintrack-core: authoritative presence state machine and derived views.
//!
//! Pure, deterministic modules with no IO, no async, and no system
//! clock access — all time values are passed in by the caller.

pub mod display;
pub mod presence;
pub mod types;
