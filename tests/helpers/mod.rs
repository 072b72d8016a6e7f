//! Test helpers module
//!
//! Fixtures, an engine wired to in-memory storage, and a mock Bot API server.
#![allow(dead_code)]

pub mod telegram_mock;
pub mod test_context;
pub mod test_data;

pub use telegram_mock::*;
pub use test_context::*;
pub use test_data::*;
