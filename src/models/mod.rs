//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod user;
pub mod message;

// Re-export commonly used models
pub use user::{User, UpsertUserRequest};
pub use message::{InboundEvent, Sender, Payload, OutboundReply, ReplyContent, Keyboard, ParseMode};
