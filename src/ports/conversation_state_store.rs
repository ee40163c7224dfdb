//! ConversationStateStore port - ephemeral per-chat waiting state.
//!
//! The purchase flow is stateless; the only stored state is a legacy
//! "waiting for price" marker that `/cancel` clears.

use async_trait::async_trait;

use crate::domain::foundation::{ChatId, DomainError};

#[async_trait]
pub trait ConversationStateStore: Send + Sync {
    /// Removes any waiting state for the chat. Absent state is not an error.
    async fn clear(&self, chat_id: ChatId) -> Result<(), DomainError>;
}
