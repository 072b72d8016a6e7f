//! Message handlers module
//!
//! Handlers for menu button labels and the free-text input of the admin flow.

pub mod admin;
pub mod menu;
