//! Telegram Bot API client over reqwest.
//!
//! Every method is a JSON `POST {base}/bot{token}/{method}` answered with
//! `{"ok": bool, "result": ..., "error_code": ..., "description": ...}`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::TelegramConfig;
use crate::domain::conversation::{Chat, InlineKeyboardMarkup};
use crate::domain::foundation::{ChatId, TelegramUserId};
use crate::domain::integration::{BotIntegration, Locale};
use crate::ports::{
    BotApi, BotApiError, BotApiFactory, BotCommandSpec, BotUser, ChatInviteLink, ChatMember,
    SentMessage, SetWebhook, WebhookInfo,
};

const PARSE_MODE: &str = "HTML";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    ok: bool,
    result: Option<T>,
    error_code: Option<i64>,
    description: Option<String>,
}

/// Client bound to one bot token.
pub struct TelegramBotApi {
    http_client: reqwest::Client,
    api_base_url: String,
    token: SecretString,
    timeout: Duration,
}

impl TelegramBotApi {
    pub fn new(
        http_client: reqwest::Client,
        api_base_url: impl Into<String>,
        token: SecretString,
        timeout: Duration,
    ) -> Self {
        Self {
            http_client,
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            token,
            timeout,
        }
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: Value) -> Result<T, BotApiError> {
        let url = format!(
            "{}/bot{}/{}",
            self.api_base_url,
            self.token.expose_secret(),
            method
        );

        // reqwest errors embed the URL, which carries the token.
        let response = self
            .http_client
            .post(url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| BotApiError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| BotApiError::Transport(e.without_url().to_string()))?;

        let envelope: Envelope<T> = match serde_json::from_str(&text) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(BotApiError::api(i64::from(status.as_u16()), text));
            }
            Err(e) => return Err(BotApiError::Decode(format!("{}: {}", method, e))),
        };

        if !envelope.ok {
            let error = BotApiError::Api {
                code: envelope.error_code,
                description: envelope.description.unwrap_or_default(),
            };
            tracing::debug!(method = %method, error = %error, "Telegram call rejected");
            return Err(error);
        }

        envelope
            .result
            .ok_or_else(|| BotApiError::Decode(format!("{}: missing result", method)))
    }
}

fn with_markup(mut body: Value, reply_markup: Option<&InlineKeyboardMarkup>) -> Value {
    if let Some(markup) = reply_markup {
        body["reply_markup"] = json!(markup);
    }
    body
}

#[async_trait]
impl BotApi for TelegramBotApi {
    async fn get_me(&self) -> Result<BotUser, BotApiError> {
        self.call("getMe", json!({})).await
    }

    async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        reply_markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<SentMessage, BotApiError> {
        let body = json!({
            "chat_id": chat_id.get(),
            "text": text,
            "parse_mode": PARSE_MODE,
            "disable_web_page_preview": true,
        });
        self.call("sendMessage", with_markup(body, reply_markup)).await
    }

    async fn edit_message_text(
        &self,
        chat_id: ChatId,
        message_id: i64,
        text: &str,
        reply_markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<(), BotApiError> {
        let body = json!({
            "chat_id": chat_id.get(),
            "message_id": message_id,
            "text": text,
            "parse_mode": PARSE_MODE,
            "disable_web_page_preview": true,
        });
        // Result is the edited Message, or `true` for inline messages.
        let _: Value = self.call("editMessageText", with_markup(body, reply_markup)).await?;
        Ok(())
    }

    async fn answer_callback_query(&self, callback_query_id: &str) -> Result<(), BotApiError> {
        let _: bool = self
            .call(
                "answerCallbackQuery",
                json!({ "callback_query_id": callback_query_id }),
            )
            .await?;
        Ok(())
    }

    async fn add_chat_member(
        &self,
        channel_id: &str,
        user_id: TelegramUserId,
    ) -> Result<bool, BotApiError> {
        self.call(
            "addChatMember",
            json!({ "chat_id": channel_id, "user_id": user_id.get() }),
        )
        .await
    }

    async fn invite_chat_member(
        &self,
        channel_id: &str,
        user_id: TelegramUserId,
    ) -> Result<bool, BotApiError> {
        self.call(
            "inviteChatMember",
            json!({ "chat_id": channel_id, "user_id": user_id.get() }),
        )
        .await
    }

    async fn get_chat_member(
        &self,
        channel_id: &str,
        user_id: TelegramUserId,
    ) -> Result<ChatMember, BotApiError> {
        self.call(
            "getChatMember",
            json!({ "chat_id": channel_id, "user_id": user_id.get() }),
        )
        .await
    }

    async fn get_chat(&self, channel_id: &str) -> Result<Chat, BotApiError> {
        self.call("getChat", json!({ "chat_id": channel_id })).await
    }

    async fn create_chat_invite_link(
        &self,
        channel_id: &str,
        name: &str,
    ) -> Result<ChatInviteLink, BotApiError> {
        self.call(
            "createChatInviteLink",
            json!({
                "chat_id": channel_id,
                "name": name,
                "creates_join_request": false,
            }),
        )
        .await
    }

    async fn export_chat_invite_link(&self, channel_id: &str) -> Result<String, BotApiError> {
        self.call("exportChatInviteLink", json!({ "chat_id": channel_id }))
            .await
    }

    async fn set_webhook(&self, request: &SetWebhook) -> Result<(), BotApiError> {
        let _: bool = self.call("setWebhook", json!(request)).await?;
        Ok(())
    }

    async fn set_my_commands(
        &self,
        commands: &[BotCommandSpec],
        language: Option<Locale>,
    ) -> Result<(), BotApiError> {
        let mut body = json!({
            "commands": commands,
            "scope": { "type": "all_private_chats" },
        });
        if let Some(locale) = language {
            body["language_code"] = json!(locale.code());
        }
        let _: bool = self.call("setMyCommands", body).await?;
        Ok(())
    }

    async fn get_webhook_info(&self) -> Result<WebhookInfo, BotApiError> {
        self.call("getWebhookInfo", json!({})).await
    }
}

/// Hands out clients that share one connection pool.
#[derive(Clone)]
pub struct TelegramBotApiFactory {
    http_client: reqwest::Client,
    api_base_url: String,
    timeout: Duration,
}

impl TelegramBotApiFactory {
    pub fn new(config: &TelegramConfig) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_base_url: config.api_base_url.clone(),
            timeout: config.request_timeout(),
        }
    }
}

impl BotApiFactory for TelegramBotApiFactory {
    fn for_integration(&self, integration: &BotIntegration) -> Arc<dyn BotApi> {
        Arc::new(TelegramBotApi::new(
            self.http_client.clone(),
            self.api_base_url.clone(),
            integration.bot_token.clone(),
            self.timeout,
        ))
    }
}
