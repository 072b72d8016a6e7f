//! Telegram adapter
//!
//! Turns Bot API updates into inbound events and delivers outbound replies.

pub mod commands;
pub mod delivery;
pub mod dispatcher;

pub use commands::{inbound_event, Command};
pub use delivery::TelegramDelivery;
pub use dispatcher::schema;
