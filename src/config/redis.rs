//! Redis configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Upper bound for how long a webhook delivery may hold its event claim.
const MAX_CLAIM_LEASE_SECS: u64 = 900;

/// Redis holds webhook idempotency markers and conversation waiting state.
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    /// `redis://` or `rediss://` URL
    pub url: String,

    /// Seconds to wait for the initial connection
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Seconds a delivery holds an event claim before a redelivery may take over
    #[serde(default = "default_claim_lease")]
    pub claim_lease_secs: u64,
}

impl RedisConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn claim_lease(&self) -> Duration {
        Duration::from_secs(self.claim_lease_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::MissingRequired("REDIS__URL"));
        }
        if !self.url.starts_with("redis://") && !self.url.starts_with("rediss://") {
            return Err(ValidationError::InvalidRedisUrl);
        }
        if self.connect_timeout_secs == 0 {
            return Err(ValidationError::InvalidValue("REDIS__CONNECT_TIMEOUT_SECS"));
        }
        if self.claim_lease_secs == 0 || self.claim_lease_secs > MAX_CLAIM_LEASE_SECS {
            return Err(ValidationError::InvalidValue("REDIS__CLAIM_LEASE_SECS"));
        }
        Ok(())
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            connect_timeout_secs: default_connect_timeout(),
            claim_lease_secs: default_claim_lease(),
        }
    }
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_claim_lease() -> u64 {
    120
}
