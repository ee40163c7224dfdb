//! BotIntegration - one bot, one gated channel, one set of prices.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};

use crate::domain::foundation::{BotIntegrationId, ValidationError};

use super::locale::Locale;
use super::price_ids::PriceIds;
use super::routing_secret::RoutingSecret;

/// A deployed bot tenant.
#[derive(Debug, Clone)]
pub struct BotIntegration {
    pub id: BotIntegrationId,
    pub name: String,
    pub bot_token: SecretString,
    /// Handle without the leading `@`, when known.
    pub bot_username: Option<String>,
    /// Generated once at creation, never rotated.
    pub routing_secret: RoutingSecret,
    /// Numeric id (`-100...`) or `@channelusername`.
    pub channel_id: String,
    pub price_ids: PriceIds,
    pub default_locale: Locale,
    /// Telegram HTML shown on `/start`.
    pub offer_text: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Administrator-editable fields, already validated.
#[derive(Debug, Clone)]
pub struct IntegrationSettings {
    pub name: String,
    pub bot_token: SecretString,
    pub bot_username: Option<String>,
    pub channel_id: String,
    pub price_ids: PriceIds,
    pub default_locale: Locale,
    pub offer_text: String,
    pub active: bool,
}

impl BotIntegration {
    pub fn new(settings: IntegrationSettings, routing_secret: RoutingSecret) -> Self {
        let now = Utc::now();
        Self {
            id: BotIntegrationId::new(),
            name: settings.name,
            bot_token: settings.bot_token,
            bot_username: settings.bot_username,
            routing_secret,
            channel_id: settings.channel_id,
            price_ids: settings.price_ids,
            default_locale: settings.default_locale,
            offer_text: settings.offer_text,
            active: settings.active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces editable fields, keeping id, routing secret and creation time.
    pub fn apply(&mut self, settings: IntegrationSettings) {
        self.name = settings.name;
        self.bot_token = settings.bot_token;
        self.bot_username = settings.bot_username;
        self.channel_id = settings.channel_id;
        self.price_ids = settings.price_ids;
        self.default_locale = settings.default_locale;
        self.offer_text = settings.offer_text;
        self.active = settings.active;
        self.updated_at = Utc::now();
    }

    pub fn offers_price(&self, price_id: &str) -> bool {
        self.price_ids.contains(price_id)
    }

    pub fn bot_token(&self) -> &str {
        self.bot_token.expose_secret()
    }
}

/// Returns the trimmed value or an empty-field error.
pub fn require_non_blank(field: &str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::empty_field(field));
    }
    Ok(trimmed.to_string())
}

/// Normalizes an optional bot handle: strips `@`, treats blank as absent,
/// and enforces Telegram's `[A-Za-z0-9_]{5,32}`.
pub fn normalize_bot_username(value: Option<&str>) -> Result<Option<String>, ValidationError> {
    let Some(raw) = value.map(|v| v.trim().trim_start_matches('@')) else {
        return Ok(None);
    };
    if raw.is_empty() {
        return Ok(None);
    }
    let valid_chars = raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid_chars || !(5..=32).contains(&raw.len()) {
        return Err(ValidationError::invalid_format(
            "bot_username",
            "must be 5-32 letters, digits or underscores",
        ));
    }
    Ok(Some(raw.to_string()))
}
