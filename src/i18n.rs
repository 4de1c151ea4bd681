//! Localization bundles.
//!
//! Core code only ever produces message *keys* (`form.errors.network`,
//! `posts.title`, ...).  The render side resolves them through [`I18n`],
//! which holds one locale flattened into dotted keys.  Bundles are TOML
//! files embedded at compile time.

use std::collections::HashMap;

use thiserror::Error;

/// Locale used when the configuration does not name one.
pub const DEFAULT_LOCALE: &str = "en";

/// Bundles shipped with the binary, keyed by locale.
const BUNDLES: &[(&str, &str)] = &[
    ("en", include_str!("../locales/en.toml")),
    ("ru", include_str!("../locales/ru.toml")),
];

/// Errors raised while loading a bundle.
#[derive(Error, Debug)]
pub enum I18nError {
    #[error("failed to parse locale bundle: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("locale not found: {0}")]
    LocaleNotFound(String),
}

/// Messages of a single locale.
#[derive(Debug, Clone)]
pub struct I18n {
    locale: String,
    messages: HashMap<String, String>,
}

impl I18n {
    /// Load one of the embedded bundles.
    pub fn load(locale: &str) -> Result<Self, I18nError> {
        let (_, content) = BUNDLES
            .iter()
            .find(|(name, _)| *name == locale)
            .ok_or_else(|| I18nError::LocaleNotFound(locale.to_string()))?;
        Self::from_toml(locale, content)
    }

    /// Build a bundle from TOML text.
    pub fn from_toml(locale: &str, content: &str) -> Result<Self, I18nError> {
        let table: toml::Table = toml::from_str(content)?;

        let mut messages = HashMap::new();
        flatten_toml("", &toml::Value::Table(table), &mut messages);

        Ok(Self {
            locale: locale.to_string(),
            messages,
        })
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Translate `key`, falling back to the key itself.
    pub fn t<'a>(&'a self, key: &'a str) -> &'a str {
        self.messages.get(key).map(|s| s.as_str()).unwrap_or(key)
    }
}

/// Flatten a TOML value into a map with dot-separated keys.
fn flatten_toml(prefix: &str, value: &toml::Value, map: &mut HashMap<String, String>) {
    match value {
        toml::Value::Table(table) => {
            for (key, val) in table {
                let new_prefix = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_toml(&new_prefix, val, map);
            }
        }
        toml::Value::String(s) => {
            map.insert(prefix.to_string(), s.clone());
        }
        // Only strings are messages.
        _ => {}
    }
}
