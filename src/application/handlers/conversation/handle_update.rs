//! ConversationRouter - answers one Telegram update for one tenant.
//!
//! The dialogue is stateless: `/start` shows the offer, the offer's button
//! lists plans, a plan button opens checkout. Everything the next step needs
//! travels in the button's callback data.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::handlers::access::channel_link;
use crate::application::handlers::checkout::{
    bot_deep_link, CheckoutError, CheckoutInitiator, PlanCatalog,
};
use crate::application::handlers::subscription::SubscriptionResolver;
use crate::domain::billing::{PendingPurchase, Price, SubscriptionStatus};
use crate::domain::conversation::{
    escape_html, plan_label, BotCommand, CallbackAction, Inbound, InlineKeyboardButton,
    InlineKeyboardMarkup, PlanInterval, Update, UpdateError, User,
};
use crate::domain::foundation::{ChatId, TelegramUserId};
use crate::domain::integration::{BotIntegration, Locale};
use crate::ports::{
    BotApi, BotApiError, BotApiFactory, ConversationStateStore, MessageCatalog, MessageKey,
    PaymentProvider,
};

/// Command to handle an update addressed to a tenant's bot.
#[derive(Debug, Clone)]
pub struct HandleUpdateCommand {
    pub integration: BotIntegration,
    pub update: Update,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleUpdateResult {
    /// The bot reacted. Telegram failures while reacting are logged, not returned.
    Handled,
    /// Nothing to do for this update.
    Ignored,
}

/// The per-update view of a tenant: its bot client and the reply locale.
struct Turn<'a> {
    integration: &'a BotIntegration,
    bot: Arc<dyn BotApi>,
    locale: Locale,
}

pub struct ConversationRouter {
    bots: Arc<dyn BotApiFactory>,
    payments: Arc<dyn PaymentProvider>,
    catalog: Arc<dyn MessageCatalog>,
    state: Arc<dyn ConversationStateStore>,
    plans: PlanCatalog,
    checkout: CheckoutInitiator,
    resolver: SubscriptionResolver,
}

impl ConversationRouter {
    pub fn new(
        bots: Arc<dyn BotApiFactory>,
        payments: Arc<dyn PaymentProvider>,
        catalog: Arc<dyn MessageCatalog>,
        state: Arc<dyn ConversationStateStore>,
    ) -> Self {
        Self {
            plans: PlanCatalog::new(payments.clone()),
            checkout: CheckoutInitiator::new(payments.clone()),
            resolver: SubscriptionResolver::new(payments.clone()),
            bots,
            payments,
            catalog,
            state,
        }
    }

    /// # Errors
    ///
    /// Fails only when the update has no chat or sender to answer.
    pub async fn handle(
        &self,
        cmd: HandleUpdateCommand,
    ) -> Result<HandleUpdateResult, UpdateError> {
        let inbound = cmd.update.classify()?;
        let turn = Turn {
            integration: &cmd.integration,
            bot: self.bots.for_integration(&cmd.integration),
            locale: Locale::resolve(cmd.integration.default_locale, cmd.update.language_code()),
        };

        let outcome = match inbound {
            Inbound::Ignored => return Ok(HandleUpdateResult::Ignored),
            Inbound::Command {
                command,
                chat_id,
                user,
            } => match command {
                BotCommand::Start => self.send_offer(&turn, chat_id).await,
                BotCommand::Status => {
                    self.send_status(&turn, chat_id, TelegramUserId::new(user.id))
                        .await
                }
                BotCommand::Cancel => self.cancel(&turn, chat_id).await,
            },
            Inbound::Callback {
                query_id,
                action,
                chat_id,
                user,
            } => {
                if let Err(e) = turn.bot.answer_callback_query(&query_id).await {
                    tracing::warn!(
                        integration_id = %turn.integration.id,
                        error = %e,
                        "answerCallbackQuery failed"
                    );
                }
                match action {
                    CallbackAction::GetStarted => self.send_plans(&turn, chat_id).await,
                    CallbackAction::MaybeLater => {
                        self.send(&turn, chat_id, MessageKey::NotReady).await
                    }
                    CallbackAction::PriceSelected(price_id) => {
                        self.start_purchase(&turn, chat_id, &user, price_id).await
                    }
                    CallbackAction::Unknown(data) => {
                        tracing::warn!(
                            integration_id = %turn.integration.id,
                            callback_data = %data,
                            "Ignoring unknown callback data"
                        );
                        return Ok(HandleUpdateResult::Ignored);
                    }
                }
            }
        };

        if let Err(e) = outcome {
            tracing::warn!(
                integration_id = %turn.integration.id,
                update_id = cmd.update.update_id,
                error = %e,
                "Failed to answer Telegram update"
            );
        }
        Ok(HandleUpdateResult::Handled)
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Offer and Plans
    // ════════════════════════════════════════════════════════════════════════════

    async fn send_offer(&self, turn: &Turn<'_>, chat_id: ChatId) -> Result<(), BotApiError> {
        let markup = InlineKeyboardMarkup::new().row(vec![
            InlineKeyboardButton::callback(
                self.catalog.text(turn.locale, MessageKey::ButtonGetStarted),
                &CallbackAction::GetStarted,
            ),
            InlineKeyboardButton::callback(
                self.catalog.text(turn.locale, MessageKey::ButtonMaybeLater),
                &CallbackAction::MaybeLater,
            ),
        ]);
        turn.bot
            .send_message(chat_id, &turn.integration.offer_text, Some(&markup))
            .await?;
        Ok(())
    }

    async fn send_plans(&self, turn: &Turn<'_>, chat_id: ChatId) -> Result<(), BotApiError> {
        let plans = self.plans.fetch_sellable_plans(turn.integration).await;
        if plans.is_empty() {
            return self
                .send(turn, chat_id, MessageKey::PlansNoneAvailable)
                .await;
        }

        let mut text = format!(
            "{}\n\n",
            self.catalog.text(turn.locale, MessageKey::PlansTitle)
        );
        let mut markup = InlineKeyboardMarkup::new();
        for price in &plans {
            let label = self.plan_label(turn.locale, price);
            text.push_str(&escape_html(&label));
            text.push('\n');
            markup.push_row(vec![InlineKeyboardButton::callback(
                label,
                &CallbackAction::PriceSelected(price.id.clone()),
            )]);
        }

        turn.bot.send_message(chat_id, &text, Some(&markup)).await?;
        Ok(())
    }

    fn plan_label(&self, locale: Locale, price: &Price) -> String {
        let interval = match PlanInterval::of(price) {
            PlanInterval::Monthly => self.catalog.text(locale, MessageKey::IntervalMonthly),
            PlanInterval::Yearly => self.catalog.text(locale, MessageKey::IntervalYearly),
            PlanInterval::OneTime => self.catalog.text(locale, MessageKey::IntervalOneTime),
            PlanInterval::Other(interval) => interval,
        };
        plan_label(price, &interval)
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Checkout
    // ════════════════════════════════════════════════════════════════════════════

    async fn start_purchase(
        &self,
        turn: &Turn<'_>,
        chat_id: ChatId,
        user: &User,
        price_id: String,
    ) -> Result<(), BotApiError> {
        let generating = self.catalog.text(turn.locale, MessageKey::PaymentGenerating);
        let placeholder = match turn.bot.send_message(chat_id, &generating, None).await {
            Ok(sent) => Some(sent.message_id),
            Err(e) => {
                tracing::warn!(error = %e, "Could not send payment placeholder");
                None
            }
        };

        let return_url = bot_deep_link(self.bot_username(turn).await.as_deref());
        let purchase = PendingPurchase::new(TelegramUserId::new(user.id), chat_id, price_id);

        let (text, markup) = match self
            .checkout
            .start_checkout(turn.integration, &purchase, &return_url)
            .await
        {
            Ok(started) => {
                let account_info = escape_html(&user.account_description());
                let unsubscribe_note = if started.price.is_recurring() {
                    self.catalog.text(turn.locale, MessageKey::UnsubscribeNote)
                } else {
                    String::new()
                };
                let text = self.catalog.render(
                    turn.locale,
                    MessageKey::PaymentTerms,
                    &[
                        ("account_info", account_info.as_str()),
                        ("unsubscribe_note", unsubscribe_note.as_str()),
                    ],
                );
                let markup = InlineKeyboardMarkup::new().row(vec![InlineKeyboardButton::link(
                    self.catalog
                        .text(turn.locale, MessageKey::ButtonCompletePayment),
                    started.url,
                )]);
                (text, Some(markup))
            }
            Err(e) => {
                tracing::error!(
                    integration_id = %turn.integration.id,
                    telegram_user_id = %purchase.user_id,
                    price_id = %purchase.price_id,
                    error = %e,
                    "Failed to start checkout"
                );
                let key = match e {
                    CheckoutError::PriceNotOffered(_) => MessageKey::SomethingWrong,
                    _ => MessageKey::PaymentErrorGenerating,
                };
                (self.catalog.text(turn.locale, key), None)
            }
        };

        replace_or_send(turn.bot.as_ref(), chat_id, placeholder, &text, markup.as_ref()).await
    }

    /// Live handle from Telegram, else the stored one.
    async fn bot_username(&self, turn: &Turn<'_>) -> Option<String> {
        match turn.bot.get_me().await {
            Ok(me) if me.username.is_some() => me.username,
            Ok(_) => turn.integration.bot_username.clone(),
            Err(e) => {
                tracing::debug!(error = %e, "getMe failed, using stored bot username");
                turn.integration.bot_username.clone()
            }
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Status and Cancel
    // ════════════════════════════════════════════════════════════════════════════

    async fn send_status(
        &self,
        turn: &Turn<'_>,
        chat_id: ChatId,
        user_id: TelegramUserId,
    ) -> Result<(), BotApiError> {
        let status = self.resolver.resolve(user_id).await;

        let text = match &status {
            SubscriptionStatus::Active(_) => self.catalog.text(turn.locale, MessageKey::StatusActive),
            SubscriptionStatus::Expiring { ends_at, .. } => {
                self.render_ends_at(turn.locale, MessageKey::StatusExpiring, *ends_at)
            }
            SubscriptionStatus::Cancelled { ends_at, .. } => {
                self.render_ends_at(turn.locale, MessageKey::StatusCancelled, *ends_at)
            }
            SubscriptionStatus::None => self.catalog.text(turn.locale, MessageKey::StatusNone),
            SubscriptionStatus::Error => self.catalog.text(turn.locale, MessageKey::StatusError),
        };

        let mut markup = InlineKeyboardMarkup::new();
        if let Some(entitlement) = status.entitlement() {
            if let Some(link) = channel_link(turn.bot.as_ref(), &turn.integration.channel_id).await
            {
                markup.push_row(vec![InlineKeyboardButton::link(
                    self.catalog.text(turn.locale, MessageKey::ButtonOpenChannel),
                    link,
                )]);
            }
            if let Some(url) = self.portal_url(turn, &entitlement.customer_id).await {
                markup.push_row(vec![InlineKeyboardButton::link(
                    self.catalog
                        .text(turn.locale, MessageKey::ButtonManageSubscription),
                    url,
                )]);
            }
        }

        turn.bot
            .send_message(chat_id, &text, markup.into_option().as_ref())
            .await?;
        Ok(())
    }

    fn render_ends_at(&self, locale: Locale, key: MessageKey, ends_at: Option<i64>) -> String {
        let date = ends_at
            .and_then(format_date)
            .unwrap_or_else(|| self.catalog.text(locale, MessageKey::StatusEndsAtFallback));
        self.catalog.render(locale, key, &[("ends_at", date.as_str())])
    }

    async fn portal_url(&self, turn: &Turn<'_>, customer_id: &str) -> Option<String> {
        let return_url = bot_deep_link(self.bot_username(turn).await.as_deref());
        match self
            .payments
            .create_portal_session(customer_id, &return_url)
            .await
        {
            Ok(session) => Some(session.url),
            Err(e) => {
                tracing::warn!(
                    customer_id = %customer_id,
                    error = %e,
                    "Could not create billing portal session"
                );
                None
            }
        }
    }

    async fn cancel(&self, turn: &Turn<'_>, chat_id: ChatId) -> Result<(), BotApiError> {
        if let Err(e) = self.state.clear(chat_id).await {
            tracing::warn!(chat_id = %chat_id, error = %e, "Could not clear conversation state");
        }
        self.send(turn, chat_id, MessageKey::CancelConfirmation).await
    }

    async fn send(&self, turn: &Turn<'_>, chat_id: ChatId, key: MessageKey) -> Result<(), BotApiError> {
        let text = self.catalog.text(turn.locale, key);
        turn.bot.send_message(chat_id, &text, None).await?;
        Ok(())
    }
}

/// Edits the placeholder into the final message; sends a new one when
/// there is no placeholder or the edit fails.
async fn replace_or_send(
    bot: &dyn BotApi,
    chat_id: ChatId,
    placeholder: Option<i64>,
    text: &str,
    markup: Option<&InlineKeyboardMarkup>,
) -> Result<(), BotApiError> {
    if let Some(message_id) = placeholder {
        match bot.edit_message_text(chat_id, message_id, text, markup).await {
            Ok(()) => return Ok(()),
            Err(e) => tracing::warn!(error = %e, "Could not edit placeholder, sending instead"),
        }
    }
    bot.send_message(chat_id, text, markup).await?;
    Ok(())
}

/// `Month DD, YYYY` in UTC.
fn format_date(timestamp: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(timestamp, 0).map(|dt| dt.format("%B %d, %Y").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::i18n::BuiltinMessageCatalog;
    use crate::adapters::memory::InMemoryConversationStateStore;
    use crate::adapters::stripe::MockPaymentProvider;
    use crate::adapters::telegram::{MockBotApi, MockBotApiFactory};
    use crate::application::handlers::test_support::{customer, price, subscription, tenant, user};
    use crate::domain::billing::{SubscriptionState, USER_ID_KEY};
    use crate::domain::conversation::{CallbackQuery, Chat, Message};
    use crate::ports::PaymentError;

    // ════════════════════════════════════════════════════════════════════════════
    // Test Helpers
    // ════════════════════════════════════════════════════════════════════════════

    struct Fixture {
        bot: MockBotApi,
        payments: MockPaymentProvider,
        state: Arc<InMemoryConversationStateStore>,
        router: ConversationRouter,
        integration: BotIntegration,
    }

    fn fixture() -> Fixture {
        let bot = MockBotApi::new();
        let payments = MockPaymentProvider::new();
        payments.add_price(price("price_monthly", 500, Some("month")));
        payments.add_price(price("price_lifetime", 5000, None));
        let state = Arc::new(InMemoryConversationStateStore::new());
        let router = ConversationRouter::new(
            Arc::new(MockBotApiFactory::new(bot.clone())),
            Arc::new(payments.clone()),
            Arc::new(BuiltinMessageCatalog::new()),
            state.clone(),
        );
        Fixture {
            bot,
            payments,
            state,
            router,
            integration: tenant(&["price_monthly", "price_lifetime"]),
        }
    }

    fn private_chat() -> Chat {
        Chat {
            id: 42,
            kind: Some("private".to_string()),
            username: Some("olena_k".to_string()),
        }
    }

    fn text_update(text: &str) -> Update {
        Update {
            update_id: 1,
            message: Some(Message {
                message_id: 10,
                chat: private_chat(),
                from: Some(user(42)),
                text: Some(text.to_string()),
            }),
            callback_query: None,
        }
    }

    fn callback_update(data: &str) -> Update {
        Update {
            update_id: 2,
            message: None,
            callback_query: Some(CallbackQuery {
                id: "cbq_1".to_string(),
                from: user(42),
                message: Some(Message {
                    message_id: 11,
                    chat: private_chat(),
                    from: None,
                    text: None,
                }),
                data: Some(data.to_string()),
            }),
        }
    }

    async fn handle(f: &Fixture, update: Update) -> HandleUpdateResult {
        f.router
            .handle(HandleUpdateCommand {
                integration: f.integration.clone(),
                update,
            })
            .await
            .unwrap()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Offer and Plans
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn start_sends_offer_with_two_buttons() {
        let f = fixture();

        assert_eq!(handle(&f, text_update("/start")).await, HandleUpdateResult::Handled);

        let message = f.bot.last_text().unwrap();
        assert_eq!(message.text, f.integration.offer_text);
        let buttons: Vec<_> = message.reply_markup.unwrap().buttons().cloned().collect();
        assert_eq!(buttons.len(), 2);
        assert_eq!(buttons[0].callback_data.as_deref(), Some("get_started"));
        assert_eq!(buttons[1].callback_data.as_deref(), Some("maybe_later"));
    }

    #[tokio::test]
    async fn get_started_lists_plans_after_answering_callback() {
        let f = fixture();

        handle(&f, callback_update("get_started")).await;

        let calls = f.bot.calls();
        assert_eq!(calls[0].method, "answerCallbackQuery");
        let message = f.bot.last_text().unwrap();
        assert_eq!(
            message.button_texts(),
            vec!["$5.00 - monthly", "$50.00 - one-time"]
        );
        let data: Vec<_> = message
            .reply_markup
            .unwrap()
            .buttons()
            .filter_map(|b| b.callback_data.clone())
            .collect();
        assert_eq!(data, vec!["price_price_monthly", "price_price_lifetime"]);
        assert!(message.text.contains("$5.00 - monthly"));
    }

    #[tokio::test]
    async fn no_sellable_plans_says_so() {
        let mut f = fixture();
        f.integration = tenant(&["price_gone"]);

        handle(&f, callback_update("get_started")).await;

        assert!(f.bot.last_text().unwrap().text.contains("No plans are available"));
    }

    #[tokio::test]
    async fn user_language_overrides_tenant_default() {
        let f = fixture();
        let mut update = callback_update("get_started");
        if let Some(query) = update.callback_query.as_mut() {
            query.from.language_code = Some("uk-UA".to_string());
        }

        handle(&f, update).await;

        let labels = f.bot.last_text().unwrap().button_texts();
        assert_eq!(labels[0], "$5.00 - щомісяця");
    }

    #[tokio::test]
    async fn maybe_later_sends_decline_acknowledgment() {
        let f = fixture();

        handle(&f, callback_update("maybe_later")).await;

        assert_eq!(f.bot.call_count("answerCallbackQuery"), 1);
        assert!(f.bot.last_text().unwrap().text.contains("whenever you are ready"));
    }

    #[tokio::test]
    async fn unknown_callback_is_ignored_after_answering() {
        let f = fixture();

        assert_eq!(
            handle(&f, callback_update("bogus")).await,
            HandleUpdateResult::Ignored
        );
        assert_eq!(f.bot.call_count("answerCallbackQuery"), 1);
        assert!(f.bot.outbox().is_empty());
    }

    #[tokio::test]
    async fn plain_text_is_ignored() {
        let f = fixture();

        assert_eq!(
            handle(&f, text_update("hello")).await,
            HandleUpdateResult::Ignored
        );
        assert!(f.bot.calls().is_empty());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Checkout
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn price_selection_edits_placeholder_into_terms() {
        let f = fixture();

        handle(&f, callback_update("price_price_monthly")).await;

        let outbox = f.bot.outbox();
        assert_eq!(outbox[0].method, "sendMessage");
        assert!(outbox[0].text.contains("Generating"));
        let terms = &outbox[1];
        assert_eq!(terms.method, "editMessageText");
        assert_eq!(terms.message_id, Some(101));
        assert!(terms.text.contains("@olena_k - Olena Kovalenko"));
        assert!(terms.text.contains("cancel your subscription"));
        assert!(terms.button_urls()[0].starts_with("https://checkout.stripe.com/"));

        let request = &f.payments.checkout_requests()[0];
        assert_eq!(request.success_url, "https://t.me/gate_bot");
    }

    #[tokio::test]
    async fn one_time_terms_have_no_unsubscribe_note() {
        let f = fixture();

        handle(&f, callback_update("price_price_lifetime")).await;

        let terms = f.bot.last_text().unwrap();
        assert!(!terms.text.contains("cancel your subscription"));
    }

    #[tokio::test]
    async fn return_url_falls_back_to_stored_username() {
        let f = fixture();
        f.bot.set_bot_username(None);

        handle(&f, callback_update("price_price_monthly")).await;

        assert_eq!(
            f.payments.checkout_requests()[0].success_url,
            "https://t.me/signals_bot"
        );
    }

    #[tokio::test]
    async fn checkout_failure_replaces_placeholder_with_error() {
        let f = fixture();
        f.payments.set_method_error(
            "create_checkout_session",
            PaymentError::network("connection reset"),
        );

        handle(&f, callback_update("price_price_monthly")).await;

        let last = f.bot.last_text().unwrap();
        assert_eq!(last.method, "editMessageText");
        assert!(last.text.contains("could not create a payment link"));
        assert!(last.reply_markup.is_none());
    }

    #[tokio::test]
    async fn failed_edit_sends_new_message() {
        let f = fixture();
        f.bot.set_failure(
            "editMessageText",
            BotApiError::api(400, "message to edit not found"),
        );

        handle(&f, callback_update("price_price_monthly")).await;

        let last = f.bot.last_text().unwrap();
        assert_eq!(last.method, "sendMessage");
        assert!(last.text.contains("Almost there"));
    }

    #[tokio::test]
    async fn foreign_price_is_rejected_without_checkout() {
        let f = fixture();

        handle(&f, callback_update("price_price_other")).await;

        assert!(f.payments.checkout_requests().is_empty());
        assert!(f.bot.last_text().unwrap().text.contains("Something went wrong"));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Status and Cancel
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn active_status_has_channel_and_portal_buttons() {
        let f = fixture();
        f.payments.add_customer(customer("cus_1", &[(USER_ID_KEY, "42")]));
        f.payments
            .add_subscription(subscription("sub_1", "cus_1", SubscriptionState::Active, 100));

        handle(&f, text_update("/status")).await;

        let message = f.bot.last_text().unwrap();
        assert!(message.text.contains("active"));
        assert_eq!(
            message.button_urls(),
            vec![
                "https://t.me/+mockInvite",
                "https://billing.stripe.com/p/session/cus_1"
            ]
        );
    }

    #[tokio::test]
    async fn expiring_status_shows_end_date() {
        let f = fixture();
        f.payments.add_customer(customer("cus_1", &[(USER_ID_KEY, "42")]));
        let mut sub = subscription("sub_1", "cus_1", SubscriptionState::Active, 100);
        sub.cancel_at_period_end = true;
        sub.current_period_end = Some(1_735_689_600);
        f.payments.add_subscription(sub);

        handle(&f, text_update("/status")).await;

        assert!(f.bot.last_text().unwrap().text.contains("January 01, 2025"));
    }

    #[tokio::test]
    async fn cancelled_status_without_date_uses_fallback() {
        let f = fixture();
        f.payments.add_customer(customer("cus_1", &[(USER_ID_KEY, "42")]));
        let mut sub = subscription("sub_1", "cus_1", SubscriptionState::Canceled, 100);
        sub.current_period_end = None;
        f.payments.add_subscription(sub);

        handle(&f, text_update("/status")).await;

        assert!(f.bot.last_text().unwrap().text.contains("an unknown date"));
    }

    #[tokio::test]
    async fn no_subscription_has_no_buttons() {
        let f = fixture();

        handle(&f, text_update("/status")).await;

        let message = f.bot.last_text().unwrap();
        assert!(message.text.contains("don't have a subscription"));
        assert!(message.reply_markup.is_none());
    }

    #[tokio::test]
    async fn stripe_failure_shows_status_error() {
        let f = fixture();
        f.payments.set_method_error(
            "search_customers_by_metadata",
            PaymentError::network("timeout"),
        );

        handle(&f, text_update("/status")).await;

        assert!(f.bot.last_text().unwrap().text.contains("could not check"));
    }

    #[tokio::test]
    async fn cancel_clears_waiting_state() {
        let f = fixture();
        f.state.mark_waiting(ChatId::new(42)).await;

        handle(&f, text_update("/cancel")).await;

        assert!(!f.state.is_waiting(ChatId::new(42)).await);
        assert!(f.bot.last_text().unwrap().text.starts_with("Cancelled"));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Failure Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn update_without_message_or_callback_is_ignored() {
        let f = fixture();

        let result = f
            .router
            .handle(HandleUpdateCommand {
                integration: f.integration.clone(),
                update: Update {
                    update_id: 3,
                    message: None,
                    callback_query: None,
                },
            })
            .await
            .unwrap();

        assert_eq!(result, HandleUpdateResult::Ignored);
        assert!(f.bot.calls().is_empty());
    }

    #[tokio::test]
    async fn callback_without_message_is_an_error() {
        let f = fixture();
        let mut update = callback_update("get_started");
        if let Some(query) = update.callback_query.as_mut() {
            query.message = None;
        }

        let err = f
            .router
            .handle(HandleUpdateCommand {
                integration: f.integration.clone(),
                update,
            })
            .await
            .unwrap_err();

        assert_eq!(err, UpdateError::NoMessage);
        assert!(f.bot.calls().is_empty());
    }

    #[tokio::test]
    async fn telegram_failures_still_count_as_handled() {
        let f = fixture();
        f.bot.set_failure("sendMessage", BotApiError::Transport("down".into()));

        assert_eq!(handle(&f, text_update("/start")).await, HandleUpdateResult::Handled);
    }

    #[test]
    fn dates_render_as_month_day_year() {
        assert_eq!(format_date(1_700_000_000).as_deref(), Some("November 14, 2023"));
    }
}
