//! PaymentWebhookProcessor - Command handler for Stripe webhook deliveries.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::application::handlers::access::ChannelAccessGranter;
use crate::application::handlers::integration::BotIntegrationRegistry;
use crate::domain::billing::{
    chat_id_from, user_id_from, CheckoutMode, CheckoutSession, Customer, Expandable, Invoice,
    Metadata, PaymentEvent, StripeWebhookVerifier, Subscription, SubscriptionState, WebhookError,
};
use crate::domain::foundation::{BotIntegrationId, ChatId, DomainError, TelegramUserId};
use crate::ports::{ClaimOutcome, PaymentError, PaymentProvider, ProcessedEventStore};

/// How long a processed event id is remembered; matches Stripe's retry horizon.
pub const PROCESSED_RETENTION: Duration = Duration::from_secs(24 * 60 * 60);

/// Default for how long a delivery may hold an event before a redelivery can take over.
pub const IN_FLIGHT_LEASE: Duration = Duration::from_secs(120);

/// Command to handle a Stripe webhook delivery.
#[derive(Debug, Clone)]
pub struct HandlePaymentWebhookCommand {
    /// Raw request body, exactly as signed.
    pub payload: Vec<u8>,
    /// `Stripe-Signature` header.
    pub signature: Option<String>,
}

/// Result of webhook processing. Every variant is acknowledged with 200.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlePaymentWebhookResult {
    /// The access grant ran for this user.
    AccessGranted {
        integration_id: BotIntegrationId,
        user_id: TelegramUserId,
    },
    /// Recognized event that does not lead to access.
    Skipped(SkipReason),
    /// Already processed, or being processed by another delivery.
    Duplicate,
    /// Event type the gate does not react to.
    Ignored(String),
    /// The handler failed; logged and acknowledged.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    SubscriptionNotActive,
    NotPaid,
    NotOneTimePayment,
    MissingUserId,
    MissingPrice,
    MissingSubscription,
    NoIntegrationForPrice,
}

#[derive(Debug, Error)]
enum ProcessError {
    #[error(transparent)]
    Payment(#[from] PaymentError),
    #[error(transparent)]
    Store(#[from] DomainError),
}

impl ProcessError {
    fn is_retryable(&self) -> bool {
        match self {
            ProcessError::Payment(e) => e.code.is_retryable(),
            ProcessError::Store(_) => true,
        }
    }
}

/// Handler for Stripe webhooks.
///
/// Verifies the delivery, runs each event's handler at most once per
/// retention window, and grants channel access when a payment is confirmed.
/// Failures after verification never reach Stripe, so one tenant's broken
/// bot cannot trigger a redelivery storm.
pub struct PaymentWebhookProcessor {
    verifier: StripeWebhookVerifier,
    payments: Arc<dyn PaymentProvider>,
    registry: BotIntegrationRegistry,
    granter: ChannelAccessGranter,
    markers: Arc<dyn ProcessedEventStore>,
    claim_lease: Duration,
}

impl PaymentWebhookProcessor {
    pub fn new(
        verifier: StripeWebhookVerifier,
        payments: Arc<dyn PaymentProvider>,
        registry: BotIntegrationRegistry,
        granter: ChannelAccessGranter,
        markers: Arc<dyn ProcessedEventStore>,
    ) -> Self {
        Self {
            verifier,
            payments,
            registry,
            granter,
            markers,
            claim_lease: IN_FLIGHT_LEASE,
        }
    }

    /// Overrides [`IN_FLIGHT_LEASE`].
    pub fn with_claim_lease(mut self, lease: Duration) -> Self {
        self.claim_lease = lease;
        self
    }

    /// # Errors
    ///
    /// Only verification and decoding failures; see [`WebhookError::is_auth_failure`].
    pub async fn handle(
        &self,
        cmd: HandlePaymentWebhookCommand,
    ) -> Result<HandlePaymentWebhookResult, WebhookError> {
        // 1. Authenticate and decode
        let signature = cmd
            .signature
            .as_deref()
            .ok_or(WebhookError::MissingSignature)?;
        let event = self.verifier.verify_and_parse(&cmd.payload, signature)?;
        let payment_event = PaymentEvent::from_event(&event)
            .map_err(|e| WebhookError::MalformedPayload(e.to_string()))?;

        if let PaymentEvent::Unhandled(event_type) = payment_event {
            tracing::debug!(event_id = %event.id, event_type = %event_type, "Ignoring Stripe event");
            return Ok(HandlePaymentWebhookResult::Ignored(event_type));
        }

        // 2. Idempotency gate
        let claimed = match self.markers.try_claim(&event.id, self.claim_lease).await {
            Ok(ClaimOutcome::Claimed) => true,
            Ok(outcome) => {
                tracing::info!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    outcome = ?outcome,
                    "Skipping duplicate Stripe event"
                );
                return Ok(HandlePaymentWebhookResult::Duplicate);
            }
            Err(e) => {
                tracing::warn!(
                    event_id = %event.id,
                    error = %e,
                    "Marker store unavailable, processing without idempotency check"
                );
                false
            }
        };

        // 3. Dispatch
        let outcome = match payment_event {
            PaymentEvent::SubscriptionChanged(subscription) => {
                self.on_subscription(subscription).await
            }
            PaymentEvent::CheckoutSessionCompleted(session) => self.on_checkout(session).await,
            PaymentEvent::InvoicePaid(invoice) => self.on_invoice(invoice).await,
            PaymentEvent::Unhandled(event_type) => {
                Ok(HandlePaymentWebhookResult::Ignored(event_type))
            }
        };

        // 4. Record
        match outcome {
            Ok(result) => {
                if let Err(e) = self
                    .markers
                    .mark_processed(&event.id, PROCESSED_RETENTION)
                    .await
                {
                    tracing::warn!(event_id = %event.id, error = %e, "Could not mark event processed");
                }
                tracing::info!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    result = ?result,
                    "Stripe event processed"
                );
                Ok(result)
            }
            Err(e) => {
                tracing::error!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    error = %e,
                    retryable = e.is_retryable(),
                    "Stripe event handler failed"
                );
                if claimed {
                    if let Err(e) = self.markers.release(&event.id).await {
                        tracing::warn!(event_id = %event.id, error = %e, "Could not release event claim");
                    }
                }
                Ok(HandlePaymentWebhookResult::Failed)
            }
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Event Handlers
    // ════════════════════════════════════════════════════════════════════════════

    async fn on_subscription(
        &self,
        subscription: Subscription,
    ) -> Result<HandlePaymentWebhookResult, ProcessError> {
        if subscription.status != SubscriptionState::Active {
            return Ok(skipped(SkipReason::SubscriptionNotActive));
        }

        let mut user_id = user_id_from(&subscription.metadata);
        let mut chat_id = chat_id_from(&subscription.metadata);
        if user_id.is_none() {
            let customer = self.customer_of(&subscription.customer).await?;
            user_id = user_id_from(&customer.metadata);
            chat_id = chat_id.or_else(|| chat_id_from(&customer.metadata));
        }

        let Some(user_id) = user_id else {
            return Ok(skipped(SkipReason::MissingUserId));
        };
        let Some(price_id) = subscription.first_price_id() else {
            return Ok(skipped(SkipReason::MissingPrice));
        };

        self.grant(price_id, user_id, chat_id).await
    }

    async fn on_checkout(
        &self,
        session: CheckoutSession,
    ) -> Result<HandlePaymentWebhookResult, ProcessError> {
        if session.mode != CheckoutMode::Payment {
            return Ok(skipped(SkipReason::NotOneTimePayment));
        }
        if !session.is_paid() {
            return Ok(skipped(SkipReason::NotPaid));
        }
        let Some(user_id) = user_id_from(&session.metadata) else {
            return Ok(skipped(SkipReason::MissingUserId));
        };
        let chat_id = chat_id_from(&session.metadata);

        let line_items = self.payments.list_checkout_line_items(&session.id).await?;
        let Some(price_id) = line_items.into_iter().find_map(|item| item.price.map(|p| p.id))
        else {
            return Ok(skipped(SkipReason::MissingPrice));
        };

        self.grant(&price_id, user_id, chat_id).await
    }

    async fn on_invoice(&self, invoice: Invoice) -> Result<HandlePaymentWebhookResult, ProcessError> {
        if !invoice.is_paid() {
            return Ok(skipped(SkipReason::NotPaid));
        }

        let sources = identity_sources(&invoice);
        let user_id = sources.iter().find_map(|m| user_id_from(m));
        let chat_id = sources.iter().find_map(|m| chat_id_from(m));

        let Some(subscription_id) = invoice.subscription.as_deref() else {
            return Ok(skipped(SkipReason::MissingSubscription));
        };
        let subscription = self.payments.retrieve_subscription(subscription_id).await?;
        if subscription.status != SubscriptionState::Active {
            return Ok(skipped(SkipReason::SubscriptionNotActive));
        }

        let Some(user_id) = user_id.or_else(|| user_id_from(&subscription.metadata)) else {
            return Ok(skipped(SkipReason::MissingUserId));
        };
        let chat_id = chat_id.or_else(|| chat_id_from(&subscription.metadata));
        let Some(price_id) = subscription.first_price_id() else {
            return Ok(skipped(SkipReason::MissingPrice));
        };

        self.grant(price_id, user_id, chat_id).await
    }

    async fn grant(
        &self,
        price_id: &str,
        user_id: TelegramUserId,
        chat_id: Option<ChatId>,
    ) -> Result<HandlePaymentWebhookResult, ProcessError> {
        let Some(integration) = self.registry.resolve_by_price(price_id).await? else {
            tracing::warn!(price_id = %price_id, "No active bot integration sells this price");
            return Ok(skipped(SkipReason::NoIntegrationForPrice));
        };

        self.granter.grant(&integration, user_id, chat_id).await;

        Ok(HandlePaymentWebhookResult::AccessGranted {
            integration_id: integration.id,
            user_id,
        })
    }

    async fn customer_of(&self, customer: &Expandable<Customer>) -> Result<Customer, PaymentError> {
        match customer.object() {
            Some(customer) => Ok(customer.clone()),
            None => self.payments.retrieve_customer(customer.id()).await,
        }
    }
}

fn skipped(reason: SkipReason) -> HandlePaymentWebhookResult {
    HandlePaymentWebhookResult::Skipped(reason)
}

/// Invoice metadata in lookup priority order.
fn identity_sources(invoice: &Invoice) -> Vec<&Metadata> {
    let mut sources = Vec::with_capacity(3);
    if let Some(details) = &invoice.subscription_details {
        sources.push(&details.metadata);
    }
    sources.push(&invoice.metadata);
    if let Some(line) = invoice.lines.data.first() {
        sources.push(&line.metadata);
    }
    sources
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::i18n::BuiltinMessageCatalog;
    use crate::adapters::memory::{InMemoryBotIntegrationRepository, InMemoryProcessedEventStore};
    use crate::adapters::stripe::MockPaymentProvider;
    use crate::adapters::telegram::{MockBotApi, MockBotApiFactory};
    use crate::application::handlers::test_support::{customer, metadata, subscription, tenant};
    use crate::domain::billing::{generate_test_header, CheckoutLineItem, PriceRef, USER_ID_KEY};
    use crate::domain::integration::BotIntegration;
    use crate::ports::BotIntegrationRepository;
    use secrecy::SecretString;
    use serde_json::{json, Value};

    const SECRET: &str = "whsec_test_secret";

    // ════════════════════════════════════════════════════════════════════════════
    // Test Helpers
    // ════════════════════════════════════════════════════════════════════════════

    struct Fixture {
        bot: MockBotApi,
        payments: MockPaymentProvider,
        markers: Arc<InMemoryProcessedEventStore>,
        processor: PaymentWebhookProcessor,
        integration: BotIntegration,
    }

    async fn fixture() -> Fixture {
        let repository = Arc::new(InMemoryBotIntegrationRepository::new());
        let integration = tenant(&["price_monthly", "price_lifetime"]);
        repository.insert(&integration).await.unwrap();

        let bot = MockBotApi::new();
        let payments = MockPaymentProvider::new();
        let markers = Arc::new(InMemoryProcessedEventStore::new());
        let processor = PaymentWebhookProcessor::new(
            StripeWebhookVerifier::new(SecretString::new(SECRET.to_string())),
            Arc::new(payments.clone()),
            BotIntegrationRegistry::new(repository),
            ChannelAccessGranter::new(
                Arc::new(MockBotApiFactory::new(bot.clone())),
                Arc::new(BuiltinMessageCatalog::new()),
            ),
            markers.clone(),
        );
        Fixture {
            bot,
            payments,
            markers,
            processor,
            integration,
        }
    }

    fn signed(id: &str, event_type: &str, object: Value) -> HandlePaymentWebhookCommand {
        let payload = serde_json::to_vec(&json!({
            "id": id,
            "type": event_type,
            "created": 1_700_000_000,
            "livemode": false,
            "data": {"object": object}
        }))
        .unwrap();
        let header = generate_test_header(SECRET, chrono::Utc::now().timestamp(), &payload);
        HandlePaymentWebhookCommand {
            payload,
            signature: Some(header),
        }
    }

    fn paid_invoice() -> Value {
        json!({
            "id": "in_1",
            "paid": true,
            "customer": "cus_1",
            "subscription": "sub_1",
            "subscription_details": {"metadata": {"telegram_user_id": "42", "telegram_chat_id": "42"}},
            "lines": {"data": [{"metadata": {}, "price": {"id": "price_monthly"}}]}
        })
    }

    fn active_subscription() -> Subscription {
        subscription("sub_1", "cus_1", SubscriptionState::Active, 100)
    }

    fn granted(f: &Fixture) -> HandlePaymentWebhookResult {
        HandlePaymentWebhookResult::AccessGranted {
            integration_id: f.integration.id,
            user_id: TelegramUserId::new(42),
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Verification Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn missing_signature_is_rejected() {
        let f = fixture().await;
        let mut cmd = signed("evt_1", "invoice.paid", paid_invoice());
        cmd.signature = None;

        let err = f.processor.handle(cmd).await.unwrap_err();
        assert!(matches!(err, WebhookError::MissingSignature));
        assert!(err.is_auth_failure());
    }

    #[tokio::test]
    async fn bad_signature_runs_no_handler() {
        let f = fixture().await;
        let mut cmd = signed("evt_1", "invoice.paid", paid_invoice());
        cmd.signature = Some(format!("t={},v1=deadbeef", chrono::Utc::now().timestamp()));

        let err = f.processor.handle(cmd).await.unwrap_err();

        assert!(matches!(err, WebhookError::InvalidSignature));
        assert!(f.payments.calls().is_empty());
    }

    #[tokio::test]
    async fn recognized_event_with_wrong_shape_is_malformed() {
        let f = fixture().await;

        let err = f
            .processor
            .handle(signed("evt_1", "invoice.paid", json!({"paid": true})))
            .await
            .unwrap_err();

        assert!(matches!(err, WebhookError::MalformedPayload(_)));
        assert!(!err.is_auth_failure());
    }

    #[tokio::test]
    async fn unhandled_event_is_ignored() {
        let f = fixture().await;

        let result = f
            .processor
            .handle(signed("evt_1", "charge.refunded", json!({"id": "ch_1"})))
            .await
            .unwrap();

        assert_eq!(result, HandlePaymentWebhookResult::Ignored("charge.refunded".into()));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Invoice Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn paid_invoice_grants_access_once() {
        let f = fixture().await;
        f.payments.add_subscription(active_subscription());

        let first = f
            .processor
            .handle(signed("evt_1", "invoice.paid", paid_invoice()))
            .await
            .unwrap();
        assert_eq!(first, granted(&f));
        assert_eq!(f.bot.sent_messages().len(), 1);
        assert!(f.markers.is_processed("evt_1").await);

        let replay = f
            .processor
            .handle(signed("evt_1", "invoice.paid", paid_invoice()))
            .await
            .unwrap();
        assert_eq!(replay, HandlePaymentWebhookResult::Duplicate);
        assert_eq!(f.bot.sent_messages().len(), 1);
    }

    #[tokio::test]
    async fn invoice_identity_falls_back_to_subscription_metadata() {
        let f = fixture().await;
        let mut sub = active_subscription();
        sub.metadata = metadata(&[("telegram_user_id", "42"), ("telegram_chat_id", "-77")]);
        f.payments.add_subscription(sub);

        let result = f
            .processor
            .handle(signed(
                "evt_1",
                "invoice.payment_succeeded",
                json!({"id": "in_1", "status": "paid", "subscription": "sub_1"}),
            ))
            .await
            .unwrap();

        assert_eq!(result, granted(&f));
        assert_eq!(f.bot.last_text().unwrap().chat_id, ChatId::new(-77));
    }

    #[tokio::test]
    async fn unpaid_invoice_is_skipped() {
        let f = fixture().await;
        let mut invoice = paid_invoice();
        invoice["paid"] = json!(false);

        let result = f
            .processor
            .handle(signed("evt_1", "invoice.paid", invoice))
            .await
            .unwrap();

        assert_eq!(result, HandlePaymentWebhookResult::Skipped(SkipReason::NotPaid));
        assert!(f.bot.calls().is_empty());
    }

    #[tokio::test]
    async fn invoice_for_lapsed_subscription_is_skipped() {
        let f = fixture().await;
        f.payments
            .add_subscription(subscription("sub_1", "cus_1", SubscriptionState::PastDue, 100));

        let result = f
            .processor
            .handle(signed("evt_1", "invoice.paid", paid_invoice()))
            .await
            .unwrap();

        assert_eq!(
            result,
            HandlePaymentWebhookResult::Skipped(SkipReason::SubscriptionNotActive)
        );
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Subscription Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn active_subscription_with_customer_metadata_grants_access() {
        let f = fixture().await;
        f.payments.add_customer(customer("cus_1", &[(USER_ID_KEY, "42")]));

        let result = f
            .processor
            .handle(signed(
                "evt_sub",
                "customer.subscription.created",
                json!({
                    "id": "sub_1", "status": "active", "customer": "cus_1",
                    "items": {"data": [{"price": {"id": "price_monthly"}}]}
                }),
            ))
            .await
            .unwrap();

        assert_eq!(result, granted(&f));
        assert!(f.payments.was_called("retrieve_customer"));
        assert_eq!(f.bot.last_text().unwrap().chat_id, ChatId::new(42));
    }

    #[tokio::test]
    async fn expanded_customer_needs_no_lookup() {
        let f = fixture().await;

        let result = f
            .processor
            .handle(signed(
                "evt_sub",
                "customer.subscription.updated",
                json!({
                    "id": "sub_1", "status": "active",
                    "customer": {"id": "cus_1", "metadata": {"telegram_user_id": "42"}},
                    "items": {"data": [{"price": {"id": "price_monthly"}}]}
                }),
            ))
            .await
            .unwrap();

        assert_eq!(result, granted(&f));
        assert!(!f.payments.was_called("retrieve_customer"));
    }

    #[tokio::test]
    async fn incomplete_subscription_is_skipped() {
        let f = fixture().await;

        let result = f
            .processor
            .handle(signed(
                "evt_sub",
                "customer.subscription.created",
                json!({"id": "sub_1", "status": "incomplete", "customer": "cus_1"}),
            ))
            .await
            .unwrap();

        assert_eq!(
            result,
            HandlePaymentWebhookResult::Skipped(SkipReason::SubscriptionNotActive)
        );
    }

    #[tokio::test]
    async fn price_of_no_tenant_is_skipped() {
        let f = fixture().await;

        let result = f
            .processor
            .handle(signed(
                "evt_sub",
                "customer.subscription.created",
                json!({
                    "id": "sub_1", "status": "active", "customer": "cus_1",
                    "metadata": {"telegram_user_id": "42"},
                    "items": {"data": [{"price": {"id": "price_elsewhere"}}]}
                }),
            ))
            .await
            .unwrap();

        assert_eq!(
            result,
            HandlePaymentWebhookResult::Skipped(SkipReason::NoIntegrationForPrice)
        );
        assert!(f.bot.calls().is_empty());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Checkout Tests
    // ════════════════════════════════════════════════════════════════════════════

    fn completed_session(metadata: Value) -> Value {
        json!({
            "id": "cs_1", "mode": "payment", "payment_status": "paid",
            "customer": "cus_1", "metadata": metadata
        })
    }

    #[tokio::test]
    async fn paid_one_time_checkout_grants_access() {
        let f = fixture().await;
        f.payments.set_line_items(
            "cs_1",
            vec![CheckoutLineItem {
                price: Some(PriceRef {
                    id: "price_lifetime".to_string(),
                }),
            }],
        );

        let result = f
            .processor
            .handle(signed(
                "evt_cs",
                "checkout.session.completed",
                completed_session(json!({"telegram_user_id": "42", "telegram_chat_id": "42"})),
            ))
            .await
            .unwrap();

        assert_eq!(result, granted(&f));
    }

    #[tokio::test]
    async fn checkout_without_user_id_is_a_no_op() {
        let f = fixture().await;

        let result = f
            .processor
            .handle(signed(
                "evt_cs",
                "checkout.session.completed",
                completed_session(json!({"telegram_chat_id": "42"})),
            ))
            .await
            .unwrap();

        assert_eq!(result, HandlePaymentWebhookResult::Skipped(SkipReason::MissingUserId));
        assert!(f.bot.calls().is_empty());
        assert!(f.markers.is_processed("evt_cs").await);
    }

    #[tokio::test]
    async fn subscription_checkout_is_left_to_subscription_events() {
        let f = fixture().await;
        let mut session = completed_session(json!({"telegram_user_id": "42"}));
        session["mode"] = json!("subscription");

        let result = f
            .processor
            .handle(signed("evt_cs", "checkout.session.completed", session))
            .await
            .unwrap();

        assert_eq!(
            result,
            HandlePaymentWebhookResult::Skipped(SkipReason::NotOneTimePayment)
        );
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Idempotency and Failure Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn handler_failure_releases_claim_and_acknowledges() {
        let f = fixture().await;
        f.payments
            .set_method_error("retrieve_subscription", PaymentError::network("timeout"));

        let result = f
            .processor
            .handle(signed("evt_1", "invoice.paid", paid_invoice()))
            .await
            .unwrap();

        assert_eq!(result, HandlePaymentWebhookResult::Failed);
        assert!(!f.markers.is_processed("evt_1").await);
        assert!(!f.markers.is_in_flight("evt_1").await);

        // Redelivery after recovery runs the handler.
        f.payments.clear_errors();
        f.payments.add_subscription(active_subscription());
        let retry = f
            .processor
            .handle(signed("evt_1", "invoice.paid", paid_invoice()))
            .await
            .unwrap();
        assert_eq!(retry, granted(&f));
    }

    #[tokio::test]
    async fn in_flight_duplicate_is_acknowledged_without_handling() {
        let f = fixture().await;
        f.markers.try_claim("evt_1", IN_FLIGHT_LEASE).await.unwrap();

        let result = f
            .processor
            .handle(signed("evt_1", "invoice.paid", paid_invoice()))
            .await
            .unwrap();

        assert_eq!(result, HandlePaymentWebhookResult::Duplicate);
        assert!(f.payments.calls().is_empty());
    }

    #[tokio::test]
    async fn unavailable_marker_store_still_processes() {
        let f = fixture().await;
        f.payments.add_subscription(active_subscription());
        f.markers.set_unavailable(true).await;

        let result = f
            .processor
            .handle(signed("evt_1", "invoice.paid", paid_invoice()))
            .await
            .unwrap();

        assert_eq!(result, granted(&f));
    }

    #[tokio::test]
    async fn failed_notification_still_counts_as_granted() {
        let f = fixture().await;
        f.payments.add_subscription(active_subscription());
        f.bot
            .set_failure("sendMessage", crate::ports::BotApiError::api(403, "blocked"));

        let result = f
            .processor
            .handle(signed("evt_1", "invoice.paid", paid_invoice()))
            .await
            .unwrap();

        assert_eq!(result, granted(&f));
        assert!(f.markers.is_processed("evt_1").await);
    }

    #[test]
    fn invoice_identity_priority() {
        let invoice: Invoice = serde_json::from_value(json!({
            "id": "in_1",
            "subscription_details": {"metadata": {}},
            "metadata": {"telegram_user_id": "1"},
            "lines": {"data": [{"metadata": {"telegram_user_id": "2", "telegram_chat_id": "3"}}]}
        }))
        .unwrap();

        let sources = identity_sources(&invoice);
        assert_eq!(sources.iter().find_map(|m| user_id_from(m)), Some(TelegramUserId::new(1)));
        assert_eq!(sources.iter().find_map(|m| chat_id_from(m)), Some(ChatId::new(3)));
    }
}
