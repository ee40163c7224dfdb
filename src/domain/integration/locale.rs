//! Locales the bots speak.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Uk,
    Ru,
}

impl Locale {
    pub const ALL: [Locale; 3] = [Locale::En, Locale::Uk, Locale::Ru];

    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Uk => "uk",
            Locale::Ru => "ru",
        }
    }

    /// Maps a Telegram `language_code` onto a supported locale.
    pub fn from_language_tag(tag: &str) -> Option<Locale> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "en" | "en-us" | "en-gb" => Some(Locale::En),
            "uk" | "uk-ua" => Some(Locale::Uk),
            "ru" | "ru-ru" => Some(Locale::Ru),
            _ => None,
        }
    }

    /// The user's language when recognized, otherwise the tenant default.
    pub fn resolve(tenant_default: Locale, language_tag: Option<&str>) -> Locale {
        language_tag
            .and_then(Locale::from_language_tag)
            .unwrap_or(tenant_default)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "en" => Ok(Locale::En),
            "uk" => Ok(Locale::Uk),
            "ru" => Ok(Locale::Ru),
            other => Err(ValidationError::invalid_format(
                "default_locale",
                format!("unsupported locale '{}'", other),
            )),
        }
    }
}
