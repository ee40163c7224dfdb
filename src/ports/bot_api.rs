//! Bot API port - the Telegram calls one bot makes.
//!
//! Each tenant has its own bot token, so a [`BotApiFactory`] hands out a
//! client bound to one integration. Every call returns the decoded `result`
//! of Telegram's `{ok, result}` envelope or a [`BotApiError`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::domain::conversation::{Chat, InlineKeyboardMarkup};
use crate::domain::foundation::{ChatId, TelegramUserId};
use crate::domain::integration::{BotIntegration, Locale};

#[async_trait]
pub trait BotApi: Send + Sync {
    /// `getMe`
    async fn get_me(&self) -> Result<BotUser, BotApiError>;

    /// `sendMessage` with HTML parse mode.
    async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        reply_markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<SentMessage, BotApiError>;

    /// `editMessageText` with HTML parse mode.
    async fn edit_message_text(
        &self,
        chat_id: ChatId,
        message_id: i64,
        text: &str,
        reply_markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<(), BotApiError>;

    /// `answerCallbackQuery` without a notification text.
    async fn answer_callback_query(&self, callback_query_id: &str) -> Result<(), BotApiError>;

    /// `addChatMember`. `Ok(false)` when Telegram answers with a false result.
    async fn add_chat_member(
        &self,
        channel_id: &str,
        user_id: TelegramUserId,
    ) -> Result<bool, BotApiError>;

    /// `inviteChatMember`, the older name of the same operation.
    async fn invite_chat_member(
        &self,
        channel_id: &str,
        user_id: TelegramUserId,
    ) -> Result<bool, BotApiError>;

    /// `getChatMember`
    async fn get_chat_member(
        &self,
        channel_id: &str,
        user_id: TelegramUserId,
    ) -> Result<ChatMember, BotApiError>;

    /// `getChat`
    async fn get_chat(&self, channel_id: &str) -> Result<Chat, BotApiError>;

    /// `createChatInviteLink` without join requests.
    async fn create_chat_invite_link(
        &self,
        channel_id: &str,
        name: &str,
    ) -> Result<ChatInviteLink, BotApiError>;

    /// `exportChatInviteLink`; revokes the previous primary link.
    async fn export_chat_invite_link(&self, channel_id: &str) -> Result<String, BotApiError>;

    /// `setWebhook`
    async fn set_webhook(&self, request: &SetWebhook) -> Result<(), BotApiError>;

    /// `setMyCommands` scoped to all private chats.
    async fn set_my_commands(
        &self,
        commands: &[BotCommandSpec],
        language: Option<Locale>,
    ) -> Result<(), BotApiError>;

    /// `getWebhookInfo`
    async fn get_webhook_info(&self) -> Result<WebhookInfo, BotApiError>;
}

/// Builds a [`BotApi`] client for one tenant's bot token.
pub trait BotApiFactory: Send + Sync {
    fn for_integration(&self, integration: &BotIntegration) -> Arc<dyn BotApi>;
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BotUser {
    pub id: i64,
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct SentMessage {
    pub message_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChatMember {
    pub status: String,
}

impl ChatMember {
    /// `creator`, `administrator`, `member` and `restricted` can see the channel.
    pub fn is_member(&self) -> bool {
        matches!(
            self.status.as_str(),
            "creator" | "administrator" | "member" | "restricted"
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChatInviteLink {
    pub invite_link: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetWebhook {
    pub url: String,
    /// Echoed by Telegram in `X-Telegram-Bot-Api-Secret-Token`.
    pub secret_token: String,
    pub allowed_updates: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BotCommandSpec {
    pub command: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct WebhookInfo {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub pending_update_count: i64,
    pub last_error_date: Option<i64>,
    pub last_error_message: Option<String>,
}

/// Errors from the Telegram Bot API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BotApiError {
    /// The request never got a response.
    #[error("Telegram transport error: {0}")]
    Transport(String),

    /// Telegram answered `ok: false`.
    #[error("Telegram API error {}: {description}", code.map(|c| c.to_string()).unwrap_or_else(|| "?".to_string()))]
    Api {
        code: Option<i64>,
        description: String,
    },

    /// The response didn't match the expected shape.
    #[error("Telegram response decode error: {0}")]
    Decode(String),
}

impl BotApiError {
    pub fn api(code: i64, description: impl Into<String>) -> Self {
        BotApiError::Api {
            code: Some(code),
            description: description.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bot_api_is_object_safe() {
        fn _accepts_dyn(_api: &dyn BotApi) {}
        fn _accepts_factory(_factory: &dyn BotApiFactory) {}
    }

    #[test]
    fn member_statuses() {
        for status in ["creator", "administrator", "member", "restricted"] {
            assert!(ChatMember { status: status.to_string() }.is_member());
        }
        for status in ["left", "kicked", "something_new"] {
            assert!(!ChatMember { status: status.to_string() }.is_member());
        }
    }

    #[test]
    fn api_error_display() {
        let err = BotApiError::api(403, "Forbidden: bot is not a member of the channel chat");
        assert_eq!(
            err.to_string(),
            "Telegram API error 403: Forbidden: bot is not a member of the channel chat"
        );
    }
}
