//! Internationalization module
//!
//! This module loads the bot's message templates and renders them with
//! parameters and plural forms.

pub mod loader;

pub use loader::{I18n, TemplateParams, TemplateRenderer};
