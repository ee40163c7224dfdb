//! Billing domain - Stripe objects, webhook events and entitlement rules.

mod objects;
mod pending_purchase;
mod stripe_event;
mod subscription_status;
mod webhook_errors;
mod webhook_verifier;

pub use objects::{
    BillingPortalSession, CheckoutLineItem, CheckoutMode, CheckoutSession, Customer, Expandable,
    Invoice, InvoiceLine, List, Metadata, Price, PriceRef, Recurring, Subscription,
    SubscriptionDetails, SubscriptionItem, SubscriptionState,
};
pub use pending_purchase::{chat_id_from, user_id_from, PendingPurchase, CHAT_ID_KEY, USER_ID_KEY};
pub use stripe_event::{PaymentEvent, StripeEvent, StripeEventData};
pub use subscription_status::{
    order_customers, order_subscriptions, Entitlement, SubscriptionScan, SubscriptionStatus,
};
pub use webhook_errors::WebhookError;
pub use webhook_verifier::{generate_test_header, SignatureHeader, StripeWebhookVerifier};
