//! Webhook handlers.

mod handle_payment_webhook;

pub use handle_payment_webhook::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookResult, PaymentWebhookProcessor, SkipReason,
    IN_FLIGHT_LEASE, PROCESSED_RETENTION,
};
