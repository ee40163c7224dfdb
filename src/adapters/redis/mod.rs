//! Redis adapters for short-lived shared state.
//!
//! Both stores share one multiplexed connection; clones are cheap.

mod conversation_state_store;
mod processed_event_store;

pub use conversation_state_store::{waiting_price_key, RedisConversationStateStore};
pub use processed_event_store::{marker_key, RedisProcessedEventStore};

use crate::config::RedisConfig;
use crate::domain::foundation::DomainError;

/// Opens the multiplexed connection described by `config`.
pub async fn connect(config: &RedisConfig) -> Result<redis::aio::MultiplexedConnection, DomainError> {
    let client = redis::Client::open(config.url.as_str())
        .map_err(|e| DomainError::cache(format!("invalid Redis URL: {}", e)))?;

    tokio::time::timeout(config.connect_timeout(), client.get_multiplexed_tokio_connection())
        .await
        .map_err(|_| DomainError::cache("timed out connecting to Redis"))?
        .map_err(|e| DomainError::cache(e.to_string()))
}
