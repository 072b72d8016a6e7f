//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub bot: BotConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub state: StateConfig,
    #[serde(default)]
    pub conversation: ConversationConfig,
    #[serde(default)]
    pub templates: TemplatesConfig,
    #[serde(default)]
    pub links: LinksConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Telegram bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotConfig {
    pub token: String,
    #[serde(default)]
    pub admin_ids: Vec<i64>,
    /// Bot username used for QR deep links; resolved via `getMe` when absent
    #[serde(default)]
    pub bot_username: Option<String>,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    #[serde(default = "default_acquire_timeout_seconds")]
    pub acquire_timeout_seconds: u64,
}

/// Where conversation contexts are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StateBackend {
    Memory,
    Redis,
}

/// Conversation state storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StateConfig {
    pub backend: StateBackend,
    pub redis_url: String,
    pub prefix: String,
}

/// Dialog behavior configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConversationConfig {
    /// Idle admin dialogs older than this fall back to the initial state
    #[serde(default)]
    pub dialog_ttl_seconds: Option<u64>,
    /// Page size for the admin user list
    #[serde(default = "default_list_page_size")]
    pub list_page_size: i64,
}

/// Message template configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TemplatesConfig {
    pub directory: String,
    pub default_language: String,
    pub supported_languages: Vec<String>,
}

/// Links shown under the welcome message
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LinksConfig {
    pub instagram: String,
    pub booking: String,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: String,
    /// Log every inbound event
    #[serde(default = "enabled")]
    pub log_events: bool,
    /// Log turn durations
    #[serde(default = "enabled")]
    pub log_performance: bool,
}

fn default_list_page_size() -> i64 {
    20
}

fn enabled() -> bool {
    true
}

fn default_acquire_timeout_seconds() -> u64 {
    30
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            backend: StateBackend::Memory,
            redis_url: "redis://localhost:6379".to_string(),
            prefix: "carry:".to_string(),
        }
    }
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            dialog_ttl_seconds: None,
            list_page_size: default_list_page_size(),
        }
    }
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            directory: "translations".to_string(),
            default_language: "uk".to_string(),
            supported_languages: vec!["uk".to_string(), "en".to_string()],
        }
    }
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            instagram: "https://www.instagram.com/".to_string(),
            booking: "https://easyweek.io/".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_path: "logs".to_string(),
            log_events: true,
            log_performance: true,
        }
    }
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("CARRY")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("bot.admin_ids")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::BotError> {
        super::validation::validate_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                token: String::new(),
                admin_ids: vec![],
                bot_username: None,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/carry".to_string(),
                max_connections: 10,
                min_connections: 1,
                acquire_timeout_seconds: default_acquire_timeout_seconds(),
            },
            state: StateConfig::default(),
            conversation: ConversationConfig::default(),
            templates: TemplatesConfig::default(),
            links: LinksConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
