//! ChannelAccessGranter - lets a paying user into the tenant's channel.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::conversation::{escape_html, InlineKeyboardButton, InlineKeyboardMarkup};
use crate::domain::foundation::{ChatId, TelegramUserId};
use crate::domain::integration::BotIntegration;
use crate::ports::{BotApi, BotApiError, BotApiFactory, MessageCatalog, MessageKey};

use super::channel_link::channel_link;

/// How the user was let in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantOutcome {
    AlreadyMember,
    Added,
    InviteLinkSent(String),
    SupportContacted,
}

#[derive(Debug, Error)]
pub enum GrantError {
    #[error("Could not notify the user: {0}")]
    Notify(#[from] BotApiError),
}

/// Adds the user to the channel and tells them how to get in.
///
/// Used by the payment webhook. Safe to repeat for the same purchase.
#[derive(Clone)]
pub struct ChannelAccessGranter {
    bots: Arc<dyn BotApiFactory>,
    catalog: Arc<dyn MessageCatalog>,
}

impl ChannelAccessGranter {
    pub fn new(bots: Arc<dyn BotApiFactory>, catalog: Arc<dyn MessageCatalog>) -> Self {
        Self { bots, catalog }
    }

    /// Best-effort grant; failures are logged and swallowed.
    pub async fn grant(
        &self,
        integration: &BotIntegration,
        user_id: TelegramUserId,
        chat_id: Option<ChatId>,
    ) -> Option<GrantOutcome> {
        match self.try_grant(integration, user_id, chat_id).await {
            Ok(outcome) => {
                tracing::info!(
                    integration_id = %integration.id,
                    telegram_user_id = %user_id,
                    outcome = ?outcome,
                    "Channel access granted"
                );
                Some(outcome)
            }
            Err(e) => {
                tracing::error!(
                    integration_id = %integration.id,
                    telegram_user_id = %user_id,
                    error = %e,
                    "Channel access grant failed"
                );
                None
            }
        }
    }

    /// Adds the user, then sends the message matching their membership.
    ///
    /// The message goes to `chat_id`, or to the user's private chat when absent.
    pub async fn try_grant(
        &self,
        integration: &BotIntegration,
        user_id: TelegramUserId,
        chat_id: Option<ChatId>,
    ) -> Result<GrantOutcome, GrantError> {
        let bot = self.bots.for_integration(integration);
        let channel_id = integration.channel_id.as_str();
        let locale = integration.default_locale;
        let target = chat_id.unwrap_or_else(|| ChatId::from(user_id));

        let added = add_member(bot.as_ref(), channel_id, user_id).await;

        let already_member = match bot.get_chat_member(channel_id, user_id).await {
            Ok(member) => member.is_member(),
            Err(e) => {
                tracing::warn!(
                    integration_id = %integration.id,
                    telegram_user_id = %user_id,
                    error = %e,
                    "getChatMember failed"
                );
                false
            }
        };

        if already_member {
            let markup = channel_link(bot.as_ref(), channel_id)
                .await
                .map(|link| {
                    InlineKeyboardMarkup::new().row(vec![InlineKeyboardButton::link(
                        self.catalog.text(locale, MessageKey::ButtonOpenChannel),
                        link,
                    )])
                });
            let text = self.catalog.text(locale, MessageKey::AccessAlreadyMember);
            bot.send_message(target, &text, markup.as_ref()).await?;
            return Ok(GrantOutcome::AlreadyMember);
        }

        if added {
            let text = self.catalog.text(locale, MessageKey::AccessAdded);
            bot.send_message(target, &text, None).await?;
            return Ok(GrantOutcome::Added);
        }

        match channel_link(bot.as_ref(), channel_id).await {
            Some(link) => {
                let escaped = escape_html(&link);
                let text = self.catalog.render(
                    locale,
                    MessageKey::AccessInviteLink,
                    &[("link", escaped.as_str())],
                );
                let markup = InlineKeyboardMarkup::new().row(vec![InlineKeyboardButton::link(
                    self.catalog.text(locale, MessageKey::ButtonJoinChannel),
                    link.clone(),
                )]);
                bot.send_message(target, &text, Some(&markup)).await?;
                Ok(GrantOutcome::InviteLinkSent(link))
            }
            None => {
                let text = self.catalog.text(locale, MessageKey::AccessContactSupport);
                bot.send_message(target, &text, None).await?;
                Ok(GrantOutcome::SupportContacted)
            }
        }
    }
}

/// `addChatMember`, falling back to the legacy `inviteChatMember`.
async fn add_member(bot: &dyn BotApi, channel_id: &str, user_id: TelegramUserId) -> bool {
    match bot.add_chat_member(channel_id, user_id).await {
        Ok(true) => return true,
        Ok(false) => {}
        Err(e) => tracing::debug!(error = %e, "addChatMember failed"),
    }
    match bot.invite_chat_member(channel_id, user_id).await {
        Ok(added) => added,
        Err(e) => {
            tracing::debug!(error = %e, "inviteChatMember failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::i18n::BuiltinMessageCatalog;
    use crate::adapters::telegram::{MockBotApi, MockBotApiFactory};
    use crate::application::handlers::test_support::{tenant, CHANNEL_ID};

    fn granter() -> (MockBotApi, ChannelAccessGranter) {
        let bot = MockBotApi::new();
        let granter = ChannelAccessGranter::new(
            Arc::new(MockBotApiFactory::new(bot.clone())),
            Arc::new(BuiltinMessageCatalog::new()),
        );
        (bot, granter)
    }

    const USER: TelegramUserId = TelegramUserId::new(42);

    // ════════════════════════════════════════════════════════════════════════════
    // Outcome Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn existing_member_gets_confirmation_with_channel_button() {
        let (bot, granter) = granter();
        bot.set_member_status("member");

        let outcome = granter
            .try_grant(&tenant(&["price_a"]), USER, Some(ChatId::new(42)))
            .await
            .unwrap();

        assert_eq!(outcome, GrantOutcome::AlreadyMember);
        let message = bot.sent_messages().pop().unwrap();
        assert_eq!(message.chat_id, ChatId::new(42));
        assert!(message.text.contains("already a member"));
        assert_eq!(message.button_urls(), vec!["https://t.me/+mockInvite"]);
    }

    #[tokio::test]
    async fn direct_add_success_reports_added() {
        let (bot, granter) = granter();
        bot.set_add_result(Ok(true));

        let outcome = granter
            .try_grant(&tenant(&["price_a"]), USER, Some(ChatId::new(42)))
            .await
            .unwrap();

        assert_eq!(outcome, GrantOutcome::Added);
        assert_eq!(bot.call_count("inviteChatMember"), 0);
        assert!(bot.last_text().unwrap().text.contains("added to the channel"));
    }

    #[tokio::test]
    async fn legacy_invite_is_tried_after_failed_add() {
        let (bot, granter) = granter();
        bot.set_add_result(Err(BotApiError::api(404, "Not Found")));
        bot.set_invite_result(Ok(true));

        let outcome = granter
            .try_grant(&tenant(&["price_a"]), USER, None)
            .await
            .unwrap();

        assert_eq!(outcome, GrantOutcome::Added);
        let invite = bot
            .calls()
            .into_iter()
            .find(|c| c.method == "inviteChatMember")
            .unwrap();
        assert_eq!(invite.args, vec![CHANNEL_ID.to_string(), "42".to_string()]);
    }

    #[tokio::test]
    async fn non_member_gets_invite_link() {
        let (bot, granter) = granter();

        let outcome = granter
            .try_grant(&tenant(&["price_a"]), USER, Some(ChatId::new(42)))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            GrantOutcome::InviteLinkSent("https://t.me/+mockInvite".to_string())
        );
        let message = bot.last_text().unwrap();
        assert!(message.text.contains("https://t.me/+mockInvite"));
        assert_eq!(message.button_urls(), vec!["https://t.me/+mockInvite"]);
        assert_eq!(message.button_texts(), vec!["👉 Join channel"]);
    }

    #[tokio::test]
    async fn no_link_means_contact_support() {
        let (bot, granter) = granter();
        bot.set_invite_link(Err(BotApiError::api(400, "not enough rights")));
        bot.set_exported_link(Err(BotApiError::api(400, "not enough rights")));

        let outcome = granter
            .try_grant(&tenant(&["price_a"]), USER, Some(ChatId::new(42)))
            .await
            .unwrap();

        assert_eq!(outcome, GrantOutcome::SupportContacted);
        assert!(bot.last_text().unwrap().text.contains("contact support"));
    }

    #[tokio::test]
    async fn kicked_user_is_not_a_member() {
        let (bot, granter) = granter();
        bot.set_member_status("kicked");

        let outcome = granter
            .try_grant(&tenant(&["price_a"]), USER, None)
            .await
            .unwrap();

        assert!(matches!(outcome, GrantOutcome::InviteLinkSent(_)));
    }

    #[tokio::test]
    async fn message_goes_to_user_chat_when_chat_id_missing() {
        let (bot, granter) = granter();

        granter
            .try_grant(&tenant(&["price_a"]), USER, None)
            .await
            .unwrap();

        assert_eq!(bot.last_text().unwrap().chat_id, ChatId::new(42));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Best-Effort Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn notify_failure_is_an_error_internally() {
        let (bot, granter) = granter();
        bot.set_failure("sendMessage", BotApiError::api(403, "bot was blocked by the user"));

        let err = granter
            .try_grant(&tenant(&["price_a"]), USER, None)
            .await
            .unwrap_err();

        assert!(matches!(err, GrantError::Notify(_)));
    }

    #[tokio::test]
    async fn grant_swallows_failures() {
        let (bot, granter) = granter();
        bot.set_failure("sendMessage", BotApiError::Transport("down".into()));
        bot.set_failure("getChatMember", BotApiError::Transport("down".into()));

        assert_eq!(granter.grant(&tenant(&["price_a"]), USER, None).await, None);
    }
}
