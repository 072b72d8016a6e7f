//! Message template loading and rendering
//!
//! Templates live in one JSON file per language under the templates
//! directory. Keys may be nested (`admin.ask_nickname`). A template can be a
//! plain string or an object of plural forms selected by the `count` parameter.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;
use regex::{Captures, Regex};
use serde_json::{Map, Value};
use tokio::fs;
use tracing::{debug, error, info, warn};
use crate::config::TemplatesConfig;
use crate::utils::errors::{BotError, Result};

/// Named parameters substituted into `{name}` placeholders
pub type TemplateParams = HashMap<String, String>;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z0-9_]+)\}").expect("placeholder pattern is valid")
});

/// Renders user-facing texts by template name
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, name: &str, params: &TemplateParams) -> Result<String>;
}

/// Template catalog for the supported languages
#[derive(Debug, Clone)]
pub struct I18n {
    translations: HashMap<String, Map<String, Value>>,
    default_language: String,
    supported_languages: Vec<String>,
}

impl I18n {
    pub fn new(config: &TemplatesConfig) -> Self {
        Self {
            translations: HashMap::new(),
            default_language: config.default_language.clone(),
            supported_languages: config.supported_languages.clone(),
        }
    }

    /// Load a catalog from the configured directory
    pub async fn load(config: &TemplatesConfig) -> Result<Self> {
        let mut i18n = Self::new(config);
        i18n.load_translations(Path::new(&config.directory)).await?;
        Ok(i18n)
    }

    /// Load every supported language file; only the default language is mandatory
    pub async fn load_translations(&mut self, directory: &Path) -> Result<()> {
        let supported_languages = self.supported_languages.clone();
        for lang_code in &supported_languages {
            let file_path = directory.join(format!("{}.json", lang_code));

            if !file_path.exists() {
                warn!("Template file not found: {}", file_path.display());
                if lang_code == &self.default_language {
                    return Err(BotError::Config(format!(
                        "Default language template file not found: {}",
                        file_path.display()
                    )));
                }
                continue;
            }

            let content = fs::read_to_string(&file_path).await?;
            match self.add_language(lang_code, &content) {
                Ok(()) => info!("Loaded templates for language: {}", lang_code),
                Err(e) => {
                    error!("Failed to load templates for {}: {}", lang_code, e);
                    if lang_code == &self.default_language {
                        return Err(e);
                    }
                }
            }
        }

        Ok(())
    }

    /// Register templates for one language from JSON text
    pub fn add_language(&mut self, lang_code: &str, content: &str) -> Result<()> {
        match serde_json::from_str::<Value>(content)? {
            Value::Object(map) => {
                debug!("Loaded {} template keys for {}", count_keys(&map), lang_code);
                self.translations.insert(lang_code.to_string(), map);
                Ok(())
            }
            _ => Err(BotError::Template(format!(
                "Invalid template file format for {}",
                lang_code
            ))),
        }
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// Render a template in `lang`, falling back to the default language
    pub fn render_in(&self, lang: &str, name: &str, params: &TemplateParams) -> Result<String> {
        let (value, lang) = self
            .lookup(name, lang)
            .map(|value| (value, lang))
            .or_else(|| {
                self.lookup(name, &self.default_language)
                    .map(|value| (value, self.default_language.as_str()))
            })
            .ok_or_else(|| BotError::Template(format!("template '{}' not found", name)))?;

        let text = match value {
            Value::String(text) => text.as_str(),
            Value::Object(forms) => {
                let count = params
                    .get("count")
                    .and_then(|c| c.parse::<i64>().ok())
                    .ok_or_else(|| BotError::Template(format!("template '{}' needs a numeric count", name)))?;
                forms
                    .get(plural_form(count, lang))
                    .or_else(|| forms.get("other"))
                    .and_then(Value::as_str)
                    .ok_or_else(|| BotError::Template(format!("template '{}' has no plural form for {}", name, count)))?
            }
            _ => return Err(BotError::Template(format!("template '{}' is not text", name))),
        };

        Ok(format_message(text, params))
    }

    fn lookup(&self, key: &str, lang: &str) -> Option<&Value> {
        let mut parts = key.split('.');
        let mut current = self.translations.get(lang)?.get(parts.next()?)?;
        for part in parts {
            current = current.get(part)?;
        }
        Some(current)
    }
}

impl TemplateRenderer for I18n {
    fn render(&self, name: &str, params: &TemplateParams) -> Result<String> {
        self.render_in(&self.default_language, name, params)
    }
}

/// Substitute placeholders in one pass; substituted values are never rescanned
fn format_message(template: &str, params: &TemplateParams) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match params.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// CLDR-style plural category for `count`
pub fn plural_form(count: i64, lang: &str) -> &'static str {
    match lang {
        "uk" | "ru" => {
            let n = count.unsigned_abs();
            let last_digit = n % 10;
            let last_two_digits = n % 100;

            if last_digit == 1 && last_two_digits != 11 {
                "one"
            } else if (2..=4).contains(&last_digit) && !(12..=14).contains(&last_two_digits) {
                "few"
            } else {
                "many"
            }
        }
        _ => {
            if count == 1 { "one" } else { "other" }
        }
    }
}

fn count_keys(obj: &Map<String, Value>) -> usize {
    obj.values()
        .map(|value| match value {
            Value::Object(nested) => count_keys(nested),
            _ => 1,
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn config() -> TemplatesConfig {
        TemplatesConfig {
            directory: "translations".to_string(),
            default_language: "uk".to_string(),
            supported_languages: vec!["uk".to_string(), "en".to_string()],
        }
    }

    fn params(pairs: &[(&str, &str)]) -> TemplateParams {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn catalog() -> I18n {
        let mut i18n = I18n::new(&config());
        i18n.add_language(
            "uk",
            r#"{
                "greeting": "Привіт, {name}!",
                "balance": {"one": "{count} бонус", "few": "{count} бонуси", "many": "{count} бонусів"}
            }"#,
        )
        .unwrap();
        i18n.add_language("en", r#"{"greeting": "Hello, {name}!"}"#).unwrap();
        i18n
    }

    #[test]
    fn test_plural_form_ukrainian() {
        assert_eq!(plural_form(1, "uk"), "one");
        assert_eq!(plural_form(2, "uk"), "few");
        assert_eq!(plural_form(5, "uk"), "many");
        assert_eq!(plural_form(11, "uk"), "many");
        assert_eq!(plural_form(21, "uk"), "one");
        assert_eq!(plural_form(0, "uk"), "many");
    }

    #[test]
    fn test_plural_form_english() {
        assert_eq!(plural_form(1, "en"), "one");
        assert_eq!(plural_form(0, "en"), "other");
    }

    #[test]
    fn test_render_substitutes_params() {
        let i18n = catalog();
        assert_eq!(i18n.render("greeting", &params(&[("name", "Анна")])).unwrap(), "Привіт, Анна!");
        assert_eq!(i18n.render_in("en", "greeting", &params(&[("name", "Anna")])).unwrap(), "Hello, Anna!");
    }

    #[test]
    fn test_render_plural() {
        let i18n = catalog();
        assert_eq!(i18n.render("balance", &params(&[("count", "22")])).unwrap(), "22 бонуси");
        assert_eq!(i18n.render("balance", &params(&[("count", "50")])).unwrap(), "50 бонусів");
        assert_matches!(i18n.render("balance", &params(&[])), Err(BotError::Template(_)));
    }

    #[test]
    fn test_missing_key_falls_back_then_fails() {
        let i18n = catalog();
        assert_eq!(i18n.render_in("en", "balance", &params(&[("count", "5")])).unwrap(), "5 бонусів");
        assert_matches!(i18n.render("nope", &params(&[])), Err(BotError::Template(_)));
    }

    #[tokio::test]
    async fn test_load_shipped_templates() {
        let i18n = I18n::load(&config()).await.unwrap();
        assert!(i18n.render("help", &params(&[("name", "Анна")])).is_ok());
        assert!(i18n.render_in("en", "help", &params(&[("name", "Anna")])).is_ok());
    }

    #[tokio::test]
    async fn test_load_requires_default_language_only() {
        let dir = tempfile::tempdir().unwrap();
        let directory = dir.path().to_string_lossy().to_string();

        let missing = TemplatesConfig { directory: directory.clone(), ..config() };
        assert_matches!(I18n::load(&missing).await, Err(BotError::Config(_)));

        std::fs::write(dir.path().join("uk.json"), r#"{"cancel": "Дякую!"}"#).unwrap();
        let i18n = I18n::load(&TemplatesConfig { directory, ..config() }).await.unwrap();
        assert_eq!(i18n.render_in("en", "cancel", &params(&[])).unwrap(), "Дякую!");
    }

    #[test]
    fn test_placeholders_in_values_stay_literal() {
        let text = format_message(
            "{user}[{id}]: {count}",
            &params(&[("user", "{count}{id}"), ("id", "42"), ("count", "7")]),
        );
        assert_eq!(text, "{count}{id}[42]: 7");
    }

    #[test]
    fn test_unknown_placeholder_is_kept() {
        assert_eq!(format_message("{a} {b}", &params(&[("a", "1")])), "1 {b}");
    }
}
