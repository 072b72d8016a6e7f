//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{BotError, Result};
use super::{Settings, StateBackend};

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_bot_config(&settings.bot)?;
    validate_database_config(&settings.database)?;
    validate_state_config(&settings.state)?;
    validate_conversation_config(&settings.conversation)?;
    validate_templates_config(&settings.templates)?;
    validate_links_config(&settings.links)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate bot configuration
fn validate_bot_config(config: &super::BotConfig) -> Result<()> {
    if config.token.is_empty() {
        return Err(BotError::Config(
            "Bot token is required".to_string()
        ));
    }

    if config.admin_ids.is_empty() {
        return Err(BotError::Config(
            "At least one admin ID must be configured".to_string()
        ));
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(BotError::Config(
            "Database URL is required".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(BotError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(BotError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    if config.acquire_timeout_seconds == 0 {
        return Err(BotError::Config(
            "Acquire timeout must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate conversation storage configuration
fn validate_state_config(config: &super::StateConfig) -> Result<()> {
    if config.backend == StateBackend::Redis && config.redis_url.is_empty() {
        return Err(BotError::Config(
            "Redis URL is required for the redis state backend".to_string()
        ));
    }

    Ok(())
}

fn validate_conversation_config(config: &super::ConversationConfig) -> Result<()> {
    if config.dialog_ttl_seconds == Some(0) {
        return Err(BotError::Config(
            "Dialog TTL must be greater than 0 when set".to_string()
        ));
    }

    if config.list_page_size <= 0 {
        return Err(BotError::Config(
            "List page size must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate template configuration
fn validate_templates_config(config: &super::TemplatesConfig) -> Result<()> {
    if config.default_language.is_empty() {
        return Err(BotError::Config(
            "Default language is required".to_string()
        ));
    }

    if !config.supported_languages.contains(&config.default_language) {
        return Err(BotError::Config(
            "Default language must be in supported languages list".to_string()
        ));
    }

    Ok(())
}

fn validate_links_config(config: &super::LinksConfig) -> Result<()> {
    url::Url::parse(&config.instagram)?;
    url::Url::parse(&config.booking)?;
    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(BotError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(BotError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}
