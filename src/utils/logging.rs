//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the bonus bot.

use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use crate::config::LoggingConfig;
use crate::utils::errors::{BotError, Result};

/// Initialize logging based on configuration
///
/// The returned guard flushes the file writer when dropped and must be kept
/// alive for the lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.file_path, "carry-bot.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(non_blocking))
        .try_init()
        .map_err(|e| BotError::Config(format!("Failed to initialize logging: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log user actions with structured data
pub fn log_user_action(user_id: i64, action: &str, details: Option<&str>) {
    info!(
        user_id = user_id,
        action = action,
        details = details,
        "User action performed"
    );
}

/// Log admin actions
pub fn log_admin_action(admin_id: i64, action: &str, target: Option<i64>, details: Option<&str>) {
    warn!(
        admin_id = admin_id,
        action = action,
        target = target,
        details = details,
        "Admin action performed"
    );
}

/// Log a committed balance mutation
pub fn log_balance_change(admin_id: i64, target_id: i64, previous: i64, current: i64) {
    info!(
        admin_id = admin_id,
        target_id = target_id,
        previous = previous,
        current = current,
        delta = current - previous,
        "Balance changed"
    );
}

/// Log a refused debit
pub fn log_balance_refusal(admin_id: i64, target_id: i64, balance: i64, requested: i64) {
    info!(
        admin_id = admin_id,
        target_id = target_id,
        balance = balance,
        requested = requested,
        "Debit refused: insufficient balance"
    );
}
