//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application.

use std::sync::LazyLock;
use regex::Regex;

static HANDLE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@?([A-Za-z0-9_]{4,32})$").expect("handle pattern is valid")
});

static AMOUNT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]+$").expect("amount pattern is valid")
});

/// Escape HTML special characters for Telegram's HTML parse mode
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Extract a username from free text shaped like a Telegram handle
///
/// A leading `@` is accepted and stripped. Case is preserved.
pub fn parse_handle(text: &str) -> Option<&str> {
    HANDLE_PATTERN
        .captures(text.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Check whether free text looks like a bonus amount
pub fn is_amount(text: &str) -> bool {
    AMOUNT_PATTERN.is_match(text.trim())
}

/// Check whether a command argument is a numeric user id
pub fn is_numeric(text: &str) -> bool {
    AMOUNT_PATTERN.is_match(text)
}

/// Build a Telegram deep link that starts the bot with the given payload
pub fn deep_link(bot_username: &str, payload: &str) -> String {
    format!(
        "https://t.me/{}?start={}",
        bot_username.trim_start_matches('@'),
        payload
    )
}
