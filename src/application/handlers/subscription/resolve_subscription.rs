//! SubscriptionResolver - where a Telegram user stands with Stripe.

use std::sync::Arc;

use crate::domain::billing::{
    order_customers, order_subscriptions, SubscriptionScan, SubscriptionStatus, CHAT_ID_KEY,
    USER_ID_KEY,
};
use crate::domain::foundation::TelegramUserId;
use crate::ports::{PaymentError, PaymentProvider};

/// Subscriptions listed per customer.
const SUBSCRIPTION_PAGE_SIZE: u32 = 20;

/// Classifies a user's entitlement from Stripe's current state.
///
/// Nothing is cached; every call reads Stripe. Customers are visited in id
/// order and subscriptions newest first, so the verdict does not depend on
/// the order Stripe returns them in.
#[derive(Clone)]
pub struct SubscriptionResolver {
    payments: Arc<dyn PaymentProvider>,
}

impl SubscriptionResolver {
    pub fn new(payments: Arc<dyn PaymentProvider>) -> Self {
        Self { payments }
    }

    /// Resolves by `telegram_user_id`, then by a `telegram_chat_id` equal to
    /// the user id when that finds nothing.
    ///
    /// The fallback only matches private-chat purchases, where chat and user
    /// ids coincide. A group's chat id is shared by every member and is never
    /// searched for.
    ///
    /// Stripe failures become [`SubscriptionStatus::Error`].
    pub async fn resolve(&self, user_id: TelegramUserId) -> SubscriptionStatus {
        match self.try_resolve(user_id).await {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!(
                    telegram_user_id = %user_id,
                    error = %e,
                    "Subscription lookup failed"
                );
                SubscriptionStatus::Error
            }
        }
    }

    async fn try_resolve(&self, user_id: TelegramUserId) -> Result<SubscriptionStatus, PaymentError> {
        let user_id = user_id.to_string();
        let status = self.scan(USER_ID_KEY, &user_id).await?;
        if status != SubscriptionStatus::None {
            return Ok(status);
        }
        self.scan(CHAT_ID_KEY, &user_id).await
    }

    async fn scan(&self, key: &str, value: &str) -> Result<SubscriptionStatus, PaymentError> {
        let mut customers = self.payments.search_customers_by_metadata(key, value).await?;
        order_customers(&mut customers);

        let mut scan = SubscriptionScan::new();
        for customer in &customers {
            let mut subscriptions = self
                .payments
                .list_subscriptions(&customer.id, SUBSCRIPTION_PAGE_SIZE)
                .await?;
            order_subscriptions(&mut subscriptions);

            if scan.observe(&customer.id, &subscriptions).is_break() {
                break;
            }
        }
        Ok(scan.finish())
    }
}
