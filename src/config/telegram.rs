//! Telegram Bot API configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Telegram Bot API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    /// Bot API base URL (a local Bot API server can be used instead)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Outbound request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// How many times a bot registration job is attempted
    #[serde(default = "default_registration_attempts")]
    pub registration_attempts: u32,

    /// Delay before the first registration retry, doubled on every retry
    #[serde(default = "default_registration_backoff_ms")]
    pub registration_backoff_ms: u64,
}

impl TelegramConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn registration_backoff(&self) -> Duration {
        Duration::from_millis(self.registration_backoff_ms)
    }

    /// Validate Telegram configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.api_base_url.starts_with("https://") && !self.api_base_url.starts_with("http://")
        {
            return Err(ValidationError::InvalidTelegramApiUrl);
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.registration_attempts == 0 || self.registration_attempts > 20 {
            return Err(ValidationError::InvalidRetryAttempts);
        }
        Ok(())
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout(),
            registration_attempts: default_registration_attempts(),
            registration_backoff_ms: default_registration_backoff_ms(),
        }
    }
}

fn default_api_base_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_request_timeout() -> u64 {
    15
}

fn default_registration_attempts() -> u32 {
    5
}

fn default_registration_backoff_ms() -> u64 {
    2_000
}
