//! Carry loyalty bot
//!
//! A Telegram bot for a salon's bonus program. Users check their bonus balance
//! and show a personal QR code; admins look users up and add or take bonuses.
//! This library provides the conversation engine, the transactional balance
//! ledger and the Telegram adapter around them.

pub mod config;
pub mod database;
pub mod handlers;
pub mod i18n;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;
pub mod telegram;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{BotError, Result};

// Re-export main components for easy access
pub use database::{MemoryStorage, PgStorage, Storage, UnitOfWork};
pub use handlers::{DialogSettings, HandlerDeps};
pub use i18n::{I18n, TemplateRenderer};
pub use services::{BalanceLedger, Debit, PayloadEncoder, QrCodeEncoder, UserDirectory};
pub use state::{ConversationEngine, DialogState, MemoryStateStorage, RedisStateStorage, StateStorage};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
