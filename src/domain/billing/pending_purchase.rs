//! Correlation between a Stripe object and a Telegram identity.
//!
//! Stripe knows nothing about Telegram; the only link is the metadata
//! written at checkout time and copied onto the session, the subscription
//! and the customer.

use crate::domain::foundation::{ChatId, TelegramUserId};

use super::objects::Metadata;

/// Metadata key carrying the Telegram user id.
pub const USER_ID_KEY: &str = "telegram_user_id";

/// Metadata key carrying the Telegram chat id.
pub const CHAT_ID_KEY: &str = "telegram_chat_id";

/// A purchase started from a bot conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPurchase {
    pub user_id: TelegramUserId,
    pub chat_id: ChatId,
    pub price_id: String,
}

impl PendingPurchase {
    pub fn new(user_id: TelegramUserId, chat_id: ChatId, price_id: impl Into<String>) -> Self {
        Self {
            user_id,
            chat_id,
            price_id: price_id.into(),
        }
    }

    /// Metadata attached to the checkout session and, for subscriptions,
    /// to the subscription itself.
    pub fn metadata(&self) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert(USER_ID_KEY.to_string(), self.user_id.to_string());
        metadata.insert(CHAT_ID_KEY.to_string(), self.chat_id.to_string());
        metadata
    }
}

/// Reads the Telegram user id from metadata. Blank or non-numeric values count as absent.
pub fn user_id_from(metadata: &Metadata) -> Option<TelegramUserId> {
    metadata.get(USER_ID_KEY).and_then(|v| v.parse().ok())
}

/// Reads the Telegram chat id from metadata. Blank or non-numeric values count as absent.
pub fn chat_id_from(metadata: &Metadata) -> Option<ChatId> {
    metadata.get(CHAT_ID_KEY).and_then(|v| v.parse().ok())
}
