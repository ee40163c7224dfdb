//! Redis-backed conversation waiting state.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::domain::foundation::{ChatId, DomainError};
use crate::ports::ConversationStateStore;

pub fn waiting_price_key(chat_id: ChatId) -> String {
    format!("bot_waiting_price_{}", chat_id)
}

#[derive(Clone)]
pub struct RedisConversationStateStore {
    conn: MultiplexedConnection,
}

impl RedisConversationStateStore {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl ConversationStateStore for RedisConversationStateStore {
    async fn clear(&self, chat_id: ChatId) -> Result<(), DomainError> {
        let key = waiting_price_key(chat_id);
        let mut conn = self.conn.clone();

        conn.del::<_, ()>(&key)
            .await
            .map_err(|e: redis::RedisError| DomainError::cache(e.to_string()).with_detail("key", &key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_matches_legacy_layout() {
        assert_eq!(waiting_price_key(ChatId::new(42)), "bot_waiting_price_42");
        assert_eq!(waiting_price_key(ChatId::new(-7)), "bot_waiting_price_-7");
    }
}
