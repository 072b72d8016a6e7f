//! Command handlers module
//!
//! Handlers for the commands registered with Telegram: `start` (optionally a
//! deep link), `help` and `cancel`.

pub mod help;
pub mod start;
