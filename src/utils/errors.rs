//! Error handling for the bonus bot
//!
//! This module defines the main error type used throughout the application.
//! Expected business outcomes (unknown username, refused debit) are not errors;
//! they are modelled as typed values by the directory and the ledger.

use thiserror::Error;

/// Main error type for the bonus bot
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Telegram API error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("User not found: {user_id}")]
    UserNotFound { user_id: i64 },

    #[error("Invalid bonus amount: {amount}")]
    InvalidAmount { amount: i64 },

    #[error("Bonus balance overflow for user {user_id}")]
    BalanceOverflow { user_id: i64 },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Payload encoding error: {0}")]
    Encoding(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Result type alias for bot operations
pub type Result<T> = std::result::Result<T, BotError>;

impl From<config::ConfigError> for BotError {
    fn from(err: config::ConfigError) -> Self {
        BotError::Config(err.to_string())
    }
}

impl From<qrcode::types::QrError> for BotError {
    fn from(err: qrcode::types::QrError) -> Self {
        BotError::Encoding(err.to_string())
    }
}

impl From<image::ImageError> for BotError {
    fn from(err: image::ImageError) -> Self {
        BotError::Encoding(err.to_string())
    }
}

impl BotError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            BotError::Database(_) => false,
            BotError::Migration(_) => false,
            BotError::Telegram(_) => true,
            BotError::Redis(_) => true,
            BotError::Config(_) => false,
            BotError::UserNotFound { .. } => false,
            BotError::InvalidAmount { .. } => false,
            BotError::BalanceOverflow { .. } => false,
            BotError::InvalidInput(_) => false,
            BotError::Storage(_) => true,
            BotError::Template(_) => false,
            BotError::Encoding(_) => false,
            BotError::Serialization(_) => false,
            BotError::Io(_) => true,
            BotError::UrlParse(_) => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            BotError::Database(_) => ErrorSeverity::Critical,
            BotError::Migration(_) => ErrorSeverity::Critical,
            BotError::Config(_) => ErrorSeverity::Critical,
            BotError::UserNotFound { .. } => ErrorSeverity::Warning,
            BotError::InvalidAmount { .. } => ErrorSeverity::Info,
            BotError::InvalidInput(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(BotError::UserNotFound { user_id: 42 }.to_string(), "User not found: 42");
        assert_eq!(BotError::InvalidAmount { amount: 0 }.to_string(), "Invalid bonus amount: 0");
    }

    #[test]
    fn test_severity() {
        assert_eq!(BotError::Config("x".into()).severity(), ErrorSeverity::Critical);
        assert_eq!(BotError::InvalidAmount { amount: -1 }.severity(), ErrorSeverity::Info);
        assert_eq!(BotError::Storage("poisoned".into()).severity(), ErrorSeverity::Error);
        assert_eq!(ErrorSeverity::Warning.to_string(), "WARN");
    }

    #[test]
    fn test_recoverable() {
        assert!(BotError::Storage("busy".into()).is_recoverable());
        assert!(!BotError::UserNotFound { user_id: 1 }.is_recoverable());
    }
}
