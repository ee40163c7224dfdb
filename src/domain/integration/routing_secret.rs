//! Per-tenant secret Telegram echoes back in `X-Telegram-Bot-Api-Secret-Token`.

use rand::distributions::Alphanumeric;
use rand::Rng;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use subtle::ConstantTimeEq;

/// Telegram accepts 1-256 characters of `[A-Za-z0-9_-]` here.
pub const ROUTING_SECRET_LEN: usize = 32;

#[derive(Clone)]
pub struct RoutingSecret(SecretString);

impl RoutingSecret {
    /// Generates a fresh alphanumeric secret.
    pub fn generate() -> Self {
        let value: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(ROUTING_SECRET_LEN)
            .map(char::from)
            .collect();
        Self(SecretString::new(value))
    }

    /// Wraps a secret loaded from storage or received in a request header.
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(SecretString::new(value.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Constant-time comparison with a presented token.
    pub fn matches(&self, presented: &str) -> bool {
        let expected = self.expose().as_bytes();
        let presented = presented.as_bytes();
        expected.len() == presented.len() && bool::from(expected.ct_eq(presented))
    }
}

impl fmt::Debug for RoutingSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RoutingSecret([REDACTED])")
    }
}
