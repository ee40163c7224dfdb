//! Administrator input for creating or editing a tenant.

use secrecy::SecretString;
use serde::Deserialize;

use crate::domain::foundation::ValidationError;
use crate::domain::integration::{
    normalize_bot_username, require_non_blank, IntegrationSettings, Locale, PriceIds,
    PriceIdsInput,
};

/// Raw tenant fields as submitted by the admin surface.
#[derive(Debug, Clone, Deserialize)]
pub struct IntegrationInput {
    pub name: String,
    pub bot_token: String,
    #[serde(default)]
    pub bot_username: Option<String>,
    pub channel_id: String,
    pub price_ids: PriceIdsInput,
    #[serde(default = "default_locale")]
    pub default_locale: String,
    pub offer_text: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_locale() -> String {
    Locale::En.code().to_string()
}

fn default_active() -> bool {
    true
}

impl IntegrationInput {
    /// Checks every field and normalizes price ids and the bot handle.
    pub fn validate(self) -> Result<IntegrationSettings, ValidationError> {
        let name = require_non_blank("name", &self.name)?;
        let bot_token = require_non_blank("bot_token", &self.bot_token)?;
        let channel_id = require_non_blank("channel_id", &self.channel_id)?;
        let offer_text = require_non_blank("offer_text", &self.offer_text)?;
        let price_ids = PriceIds::parse(self.price_ids)?;
        let default_locale: Locale = self.default_locale.trim().to_ascii_lowercase().parse()?;
        let bot_username = normalize_bot_username(self.bot_username.as_deref())?;

        Ok(IntegrationSettings {
            name,
            bot_token: SecretString::new(bot_token),
            bot_username,
            channel_id,
            price_ids,
            default_locale,
            // Trimmed only at the ends; inner formatting is Telegram HTML.
            offer_text,
            active: self.active,
        })
    }
}
