//! In-memory conversation waiting state.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{ChatId, DomainError};
use crate::ports::ConversationStateStore;

#[derive(Debug, Clone, Default)]
pub struct InMemoryConversationStateStore {
    waiting: Arc<RwLock<HashSet<ChatId>>>,
}

impl InMemoryConversationStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn mark_waiting(&self, chat_id: ChatId) {
        self.waiting.write().await.insert(chat_id);
    }

    pub async fn is_waiting(&self, chat_id: ChatId) -> bool {
        self.waiting.read().await.contains(&chat_id)
    }
}

#[async_trait]
impl ConversationStateStore for InMemoryConversationStateStore {
    async fn clear(&self, chat_id: ChatId) -> Result<(), DomainError> {
        self.waiting.write().await.remove(&chat_id);
        Ok(())
    }
}
