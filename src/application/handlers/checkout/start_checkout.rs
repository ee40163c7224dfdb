//! CheckoutInitiator - turns a plan selection into a hosted checkout page.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::billing::{
    CheckoutMode, Customer, PendingPurchase, Price, CHAT_ID_KEY, USER_ID_KEY,
};
use crate::domain::foundation::TelegramUserId;
use crate::domain::integration::BotIntegration;
use crate::ports::{CreateCheckoutRequest, PaymentError, PaymentProvider};

/// A checkout session ready for the user.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutStarted {
    pub url: String,
    pub session_id: String,
    pub price: Price,
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Price {0} is not sold by this bot")]
    PriceNotOffered(String),
    #[error("Price {0} is archived or does not exist")]
    PriceUnavailable(String),
    #[error("Payment provider error: {0}")]
    Payment(#[from] PaymentError),
    #[error("Checkout session {0} has no URL")]
    MissingCheckoutUrl(String),
}

/// Deep link back to a bot, or Telegram's home page when the handle is unknown.
pub fn bot_deep_link(bot_username: Option<&str>) -> String {
    match bot_username.map(str::trim).filter(|u| !u.is_empty()) {
        Some(username) => format!("https://t.me/{}", username.trim_start_matches('@')),
        None => "https://t.me".to_string(),
    }
}

#[derive(Clone)]
pub struct CheckoutInitiator {
    payments: Arc<dyn PaymentProvider>,
}

impl CheckoutInitiator {
    pub fn new(payments: Arc<dyn PaymentProvider>) -> Self {
        Self { payments }
    }

    /// Creates a checkout session for `purchase`.
    ///
    /// Both redirect targets are `return_url`. The Telegram identity rides
    /// along as session metadata and, for subscriptions, as subscription
    /// metadata.
    pub async fn start_checkout(
        &self,
        integration: &BotIntegration,
        purchase: &PendingPurchase,
        return_url: &str,
    ) -> Result<CheckoutStarted, CheckoutError> {
        if !integration.offers_price(&purchase.price_id) {
            return Err(CheckoutError::PriceNotOffered(purchase.price_id.clone()));
        }

        let price = match self.payments.retrieve_price(&purchase.price_id).await {
            Ok(price) if price.active => price,
            Ok(_) => return Err(CheckoutError::PriceUnavailable(purchase.price_id.clone())),
            Err(e) if e.is_not_found() => {
                return Err(CheckoutError::PriceUnavailable(purchase.price_id.clone()))
            }
            Err(e) => return Err(e.into()),
        };

        let customer = self.find_or_create_customer(purchase).await?;

        let mode = if price.is_recurring() {
            CheckoutMode::Subscription
        } else {
            CheckoutMode::Payment
        };
        let metadata = purchase.metadata();

        let session = self
            .payments
            .create_checkout_session(CreateCheckoutRequest {
                customer_id: customer.id.clone(),
                price_id: price.id.clone(),
                mode,
                success_url: return_url.to_string(),
                cancel_url: return_url.to_string(),
                subscription_metadata: (mode == CheckoutMode::Subscription)
                    .then(|| metadata.clone()),
                metadata,
            })
            .await?;

        tracing::info!(
            integration_id = %integration.id,
            telegram_user_id = %purchase.user_id,
            price_id = %price.id,
            customer_id = %customer.id,
            session_id = %session.id,
            mode = mode.as_str(),
            "Checkout session created"
        );

        let url = session
            .url
            .ok_or_else(|| CheckoutError::MissingCheckoutUrl(session.id.clone()))?;

        Ok(CheckoutStarted {
            url,
            session_id: session.id,
            price,
        })
    }

    /// Customer tagged with the user id, else one whose chat id equals the
    /// user id (a purchase made from the user's private chat).
    pub async fn find_customer(
        &self,
        user_id: TelegramUserId,
    ) -> Result<Option<Customer>, PaymentError> {
        let user_id = user_id.to_string();
        let by_user = self
            .payments
            .search_customers_by_metadata(USER_ID_KEY, &user_id)
            .await?;
        if let Some(customer) = by_user.into_iter().next() {
            return Ok(Some(customer));
        }

        let by_chat = self
            .payments
            .search_customers_by_metadata(CHAT_ID_KEY, &user_id)
            .await?;
        Ok(by_chat.into_iter().next())
    }

    async fn find_or_create_customer(
        &self,
        purchase: &PendingPurchase,
    ) -> Result<Customer, PaymentError> {
        if let Some(customer) = self.find_customer(purchase.user_id).await? {
            return Ok(customer);
        }

        let customer = self.payments.create_customer(purchase.metadata()).await?;
        tracing::info!(
            telegram_user_id = %purchase.user_id,
            customer_id = %customer.id,
            "Created Stripe customer"
        );
        Ok(customer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::stripe::MockPaymentProvider;
    use crate::application::handlers::test_support::{customer, price, tenant};
    use crate::domain::foundation::ChatId;
    use proptest::prelude::*;

    const RETURN_URL: &str = "https://t.me/signals_bot";

    fn purchase(price_id: &str) -> PendingPurchase {
        PendingPurchase::new(TelegramUserId::new(42), ChatId::new(42), price_id)
    }

    fn initiator() -> (MockPaymentProvider, CheckoutInitiator) {
        let payments = MockPaymentProvider::new();
        payments.add_price(price("price_monthly", 500, Some("month")));
        payments.add_price(price("price_lifetime", 5000, None));
        (payments.clone(), CheckoutInitiator::new(Arc::new(payments)))
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Checkout Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn recurring_price_opens_subscription_checkout() {
        let (payments, initiator) = initiator();
        let integration = tenant(&["price_monthly", "price_lifetime"]);

        let started = initiator
            .start_checkout(&integration, &purchase("price_monthly"), RETURN_URL)
            .await
            .unwrap();

        assert!(started.url.starts_with("https://checkout.stripe.com/"));
        let request = &payments.checkout_requests()[0];
        assert_eq!(request.mode, CheckoutMode::Subscription);
        assert_eq!(request.success_url, RETURN_URL);
        assert_eq!(request.cancel_url, RETURN_URL);
        assert_eq!(request.metadata.get(USER_ID_KEY).unwrap(), "42");
        assert_eq!(request.metadata.get(CHAT_ID_KEY).unwrap(), "42");
        assert_eq!(request.subscription_metadata.as_ref(), Some(&request.metadata));
    }

    #[tokio::test]
    async fn one_time_price_opens_payment_checkout() {
        let (payments, initiator) = initiator();
        let integration = tenant(&["price_monthly", "price_lifetime"]);

        initiator
            .start_checkout(&integration, &purchase("price_lifetime"), RETURN_URL)
            .await
            .unwrap();

        let request = &payments.checkout_requests()[0];
        assert_eq!(request.mode, CheckoutMode::Payment);
        assert!(request.subscription_metadata.is_none());
    }

    #[tokio::test]
    async fn creates_customer_with_identity_metadata() {
        let (payments, initiator) = initiator();

        initiator
            .start_checkout(&tenant(&["price_monthly"]), &purchase("price_monthly"), RETURN_URL)
            .await
            .unwrap();

        let customers = payments.customers();
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].metadata.get(USER_ID_KEY).unwrap(), "42");
        assert_eq!(payments.checkout_requests()[0].customer_id, customers[0].id);
    }

    #[tokio::test]
    async fn reuses_existing_customer() {
        let (payments, initiator) = initiator();
        payments.add_customer(customer("cus_existing", &[(USER_ID_KEY, "42")]));

        initiator
            .start_checkout(&tenant(&["price_monthly"]), &purchase("price_monthly"), RETURN_URL)
            .await
            .unwrap();

        assert!(!payments.was_called("create_customer"));
        assert_eq!(payments.checkout_requests()[0].customer_id, "cus_existing");
    }

    #[tokio::test]
    async fn price_outside_tenant_set_is_rejected() {
        let (payments, initiator) = initiator();

        let err = initiator
            .start_checkout(&tenant(&["price_monthly"]), &purchase("price_lifetime"), RETURN_URL)
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::PriceNotOffered(_)));
        assert!(payments.calls().is_empty());
    }

    #[tokio::test]
    async fn missing_price_is_unavailable() {
        let (_, initiator) = initiator();

        let err = initiator
            .start_checkout(&tenant(&["price_gone"]), &purchase("price_gone"), RETURN_URL)
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::PriceUnavailable(_)));
    }

    #[tokio::test]
    async fn session_failure_is_a_payment_error() {
        let (payments, initiator) = initiator();
        payments.set_method_error(
            "create_checkout_session",
            PaymentError::network("connection reset"),
        );

        let err = initiator
            .start_checkout(&tenant(&["price_monthly"]), &purchase("price_monthly"), RETURN_URL)
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::Payment(_)));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Customer Lookup Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn falls_back_to_private_chat_customer() {
        let (payments, initiator) = initiator();
        payments.add_customer(customer("cus_chat", &[(CHAT_ID_KEY, "42")]));

        let found = initiator.find_customer(TelegramUserId::new(42)).await.unwrap();

        assert_eq!(found.unwrap().id, "cus_chat");
    }

    #[tokio::test]
    async fn group_checkout_creates_own_customer() {
        let (payments, initiator) = initiator();
        payments.add_customer(customer(
            "cus_alice",
            &[(USER_ID_KEY, "111"), (CHAT_ID_KEY, "-500")],
        ));
        let group_purchase =
            PendingPurchase::new(TelegramUserId::new(222), ChatId::new(-500), "price_monthly");

        assert!(initiator
            .find_customer(TelegramUserId::new(222))
            .await
            .unwrap()
            .is_none());

        initiator
            .start_checkout(&tenant(&["price_monthly"]), &group_purchase, RETURN_URL)
            .await
            .unwrap();

        let requests = payments.checkout_requests();
        assert_eq!(requests.len(), 1);
        assert_ne!(requests[0].customer_id, "cus_alice");
        assert_eq!(payments.call_count("create_customer"), 1);
    }

    #[test]
    fn deep_link_uses_bot_handle() {
        assert_eq!(bot_deep_link(Some("signals_bot")), "https://t.me/signals_bot");
        assert_eq!(bot_deep_link(Some("@signals_bot")), "https://t.me/signals_bot");
        assert_eq!(bot_deep_link(Some(" ")), "https://t.me");
        assert_eq!(bot_deep_link(None), "https://t.me");
    }

    proptest! {
        #[test]
        fn user_match_always_wins_over_chat_match(
            user_first in any::<bool>(),
            extra_chat_customers in 0usize..4,
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap();
            let (payments, initiator) = initiator();

            let by_user = customer("cus_user", &[(USER_ID_KEY, "7")]);
            let chat_customers: Vec<_> = (0..extra_chat_customers)
                .map(|n| customer(&format!("cus_chat_{}", n), &[(CHAT_ID_KEY, "7")]))
                .collect();

            if user_first {
                payments.add_customer(by_user.clone());
            }
            for c in &chat_customers {
                payments.add_customer(c.clone());
            }
            if !user_first {
                payments.add_customer(by_user);
            }

            let found = runtime
                .block_on(initiator.find_customer(TelegramUserId::new(7)))
                .unwrap();

            prop_assert_eq!(found.map(|c| c.id), Some("cus_user".to_string()));
        }
    }
}
