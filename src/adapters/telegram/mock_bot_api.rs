//! Mock Telegram Bot API for testing.
//!
//! Records every call and answers from configurable state. Clones share
//! state, and [`MockBotApiFactory`] hands the same mock to every tenant.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::conversation::{Chat, InlineKeyboardMarkup};
use crate::domain::foundation::{ChatId, TelegramUserId};
use crate::domain::integration::{BotIntegration, Locale};
use crate::ports::{
    BotApi, BotApiError, BotApiFactory, BotCommandSpec, BotUser, ChatInviteLink, ChatMember,
    SentMessage, SetWebhook, WebhookInfo,
};

#[derive(Clone, Default)]
pub struct MockBotApi {
    inner: Arc<Mutex<MockState>>,
}

struct MockState {
    me: BotUser,
    add_result: Result<bool, BotApiError>,
    invite_result: Result<bool, BotApiError>,
    member_status: String,
    chat_username: Option<String>,
    invite_link: Result<String, BotApiError>,
    exported_link: Result<String, BotApiError>,
    failures: HashMap<String, BotApiError>,
    one_shot_failures: HashMap<String, VecDeque<BotApiError>>,
    calls: Vec<BotCall>,
    outbox: Vec<OutgoingText>,
    next_message_id: i64,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            me: BotUser {
                id: 1,
                username: Some("gate_bot".to_string()),
                first_name: "Gate".to_string(),
            },
            add_result: Ok(false),
            invite_result: Ok(false),
            member_status: "left".to_string(),
            chat_username: None,
            invite_link: Ok("https://t.me/+mockInvite".to_string()),
            exported_link: Ok("https://t.me/+mockExport".to_string()),
            failures: HashMap::new(),
            one_shot_failures: HashMap::new(),
            calls: Vec::new(),
            outbox: Vec::new(),
            next_message_id: 100,
        }
    }
}

/// A call as seen by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct BotCall {
    pub method: &'static str,
    pub args: Vec<String>,
}

/// A sent or edited message.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingText {
    pub method: &'static str,
    pub chat_id: ChatId,
    /// Set for edits.
    pub message_id: Option<i64>,
    pub text: String,
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

impl OutgoingText {
    pub fn button_texts(&self) -> Vec<String> {
        self.reply_markup
            .iter()
            .flat_map(|markup| markup.buttons())
            .map(|button| button.text.clone())
            .collect()
    }

    pub fn button_urls(&self) -> Vec<String> {
        self.reply_markup
            .iter()
            .flat_map(|markup| markup.buttons())
            .filter_map(|button| button.url.clone())
            .collect()
    }
}

impl MockBotApi {
    pub fn new() -> Self {
        Self::default()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    pub fn set_bot_username(&self, username: Option<&str>) {
        self.state().me.username = username.map(str::to_string);
    }

    pub fn set_add_result(&self, result: Result<bool, BotApiError>) {
        self.state().add_result = result;
    }

    pub fn set_invite_result(&self, result: Result<bool, BotApiError>) {
        self.state().invite_result = result;
    }

    pub fn set_member_status(&self, status: &str) {
        self.state().member_status = status.to_string();
    }

    /// Public handle of the gated channel.
    pub fn set_channel_username(&self, username: Option<&str>) {
        self.state().chat_username = username.map(str::to_string);
    }

    pub fn set_invite_link(&self, result: Result<String, BotApiError>) {
        self.state().invite_link = result;
    }

    pub fn set_exported_link(&self, result: Result<String, BotApiError>) {
        self.state().exported_link = result;
    }

    /// Every call to `method` fails with `error`.
    pub fn set_failure(&self, method: &str, error: BotApiError) {
        self.state().failures.insert(method.to_string(), error);
    }

    /// The next call to `method` fails with `error`; later calls use the normal answer.
    pub fn fail_next(&self, method: &str, error: BotApiError) {
        self.state()
            .one_shot_failures
            .entry(method.to_string())
            .or_default()
            .push_back(error);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Call Tracking
    // ════════════════════════════════════════════════════════════════════════════

    pub fn calls(&self) -> Vec<BotCall> {
        self.state().calls.clone()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.state().calls.iter().filter(|c| c.method == method).count()
    }

    /// Sent and edited messages, in order.
    pub fn outbox(&self) -> Vec<OutgoingText> {
        self.state().outbox.clone()
    }

    /// Only `sendMessage` entries of the outbox.
    pub fn sent_messages(&self) -> Vec<OutgoingText> {
        self.state()
            .outbox
            .iter()
            .filter(|m| m.method == "sendMessage")
            .cloned()
            .collect()
    }

    /// The final text a chat saw, counting edits.
    pub fn last_text(&self) -> Option<OutgoingText> {
        self.state().outbox.last().cloned()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Internal Helpers
    // ════════════════════════════════════════════════════════════════════════════

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, method: &'static str, args: Vec<String>) -> Result<(), BotApiError> {
        let mut state = self.state();
        state.calls.push(BotCall { method, args });

        if let Some(error) = state
            .one_shot_failures
            .get_mut(method)
            .and_then(VecDeque::pop_front)
        {
            return Err(error);
        }
        match state.failures.get(method) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl BotApi for MockBotApi {
    async fn get_me(&self) -> Result<BotUser, BotApiError> {
        self.record("getMe", vec![])?;
        Ok(self.state().me.clone())
    }

    async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        reply_markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<SentMessage, BotApiError> {
        self.record("sendMessage", vec![chat_id.to_string(), text.to_string()])?;
        let mut state = self.state();
        state.next_message_id += 1;
        let message_id = state.next_message_id;
        state.outbox.push(OutgoingText {
            method: "sendMessage",
            chat_id,
            message_id: None,
            text: text.to_string(),
            reply_markup: reply_markup.cloned(),
        });
        Ok(SentMessage { message_id })
    }

    async fn edit_message_text(
        &self,
        chat_id: ChatId,
        message_id: i64,
        text: &str,
        reply_markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<(), BotApiError> {
        self.record(
            "editMessageText",
            vec![chat_id.to_string(), message_id.to_string(), text.to_string()],
        )?;
        self.state().outbox.push(OutgoingText {
            method: "editMessageText",
            chat_id,
            message_id: Some(message_id),
            text: text.to_string(),
            reply_markup: reply_markup.cloned(),
        });
        Ok(())
    }

    async fn answer_callback_query(&self, callback_query_id: &str) -> Result<(), BotApiError> {
        self.record("answerCallbackQuery", vec![callback_query_id.to_string()])
    }

    async fn add_chat_member(
        &self,
        channel_id: &str,
        user_id: TelegramUserId,
    ) -> Result<bool, BotApiError> {
        self.record("addChatMember", vec![channel_id.to_string(), user_id.to_string()])?;
        self.state().add_result.clone()
    }

    async fn invite_chat_member(
        &self,
        channel_id: &str,
        user_id: TelegramUserId,
    ) -> Result<bool, BotApiError> {
        self.record(
            "inviteChatMember",
            vec![channel_id.to_string(), user_id.to_string()],
        )?;
        self.state().invite_result.clone()
    }

    async fn get_chat_member(
        &self,
        channel_id: &str,
        user_id: TelegramUserId,
    ) -> Result<ChatMember, BotApiError> {
        self.record("getChatMember", vec![channel_id.to_string(), user_id.to_string()])?;
        Ok(ChatMember {
            status: self.state().member_status.clone(),
        })
    }

    async fn get_chat(&self, channel_id: &str) -> Result<Chat, BotApiError> {
        self.record("getChat", vec![channel_id.to_string()])?;
        Ok(Chat {
            id: channel_id.parse().unwrap_or(-1),
            kind: Some("channel".to_string()),
            username: self.state().chat_username.clone(),
        })
    }

    async fn create_chat_invite_link(
        &self,
        channel_id: &str,
        name: &str,
    ) -> Result<ChatInviteLink, BotApiError> {
        self.record(
            "createChatInviteLink",
            vec![channel_id.to_string(), name.to_string()],
        )?;
        self.state()
            .invite_link
            .clone()
            .map(|invite_link| ChatInviteLink { invite_link })
    }

    async fn export_chat_invite_link(&self, channel_id: &str) -> Result<String, BotApiError> {
        self.record("exportChatInviteLink", vec![channel_id.to_string()])?;
        self.state().exported_link.clone()
    }

    async fn set_webhook(&self, request: &SetWebhook) -> Result<(), BotApiError> {
        self.record(
            "setWebhook",
            vec![request.url.clone(), request.allowed_updates.join(",")],
        )
    }

    async fn set_my_commands(
        &self,
        commands: &[BotCommandSpec],
        language: Option<Locale>,
    ) -> Result<(), BotApiError> {
        let mut args: Vec<String> = commands.iter().map(|c| c.command.clone()).collect();
        args.push(language.map(|l| l.code().to_string()).unwrap_or_default());
        self.record("setMyCommands", args)
    }

    async fn get_webhook_info(&self) -> Result<WebhookInfo, BotApiError> {
        self.record("getWebhookInfo", vec![])?;
        Ok(WebhookInfo::default())
    }
}

/// Returns the same [`MockBotApi`] for every tenant.
#[derive(Clone, Default)]
pub struct MockBotApiFactory {
    api: MockBotApi,
}

impl MockBotApiFactory {
    pub fn new(api: MockBotApi) -> Self {
        Self { api }
    }
}

impl BotApiFactory for MockBotApiFactory {
    fn for_integration(&self, _integration: &BotIntegration) -> Arc<dyn BotApi> {
        Arc::new(self.api.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_sent_messages_with_increasing_ids() {
        let mock = MockBotApi::new();

        let first = mock.send_message(ChatId::new(1), "a", None).await.unwrap();
        let second = mock.send_message(ChatId::new(1), "b", None).await.unwrap();

        assert!(second.message_id > first.message_id);
        assert_eq!(mock.sent_messages().len(), 2);
        assert_eq!(mock.call_count("sendMessage"), 2);
    }

    #[tokio::test]
    async fn one_shot_failure_then_success() {
        let mock = MockBotApi::new();
        mock.fail_next("setWebhook", BotApiError::Transport("reset".to_string()));
        let request = SetWebhook {
            url: "https://x".to_string(),
            secret_token: "s".to_string(),
            allowed_updates: vec![],
        };

        assert!(mock.set_webhook(&request).await.is_err());
        assert!(mock.set_webhook(&request).await.is_ok());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let mock = MockBotApi::new();
        let clone = mock.clone();
        clone.set_member_status("member");

        let member = mock
            .get_chat_member("-1001", TelegramUserId::new(1))
            .await
            .unwrap();
        assert!(member.is_member());
    }
}
