//! Stripe payment provider adapter.
//!
//! Implements the `PaymentProvider` port for Stripe, including:
//! - Price lookup
//! - Customer search by metadata and creation
//! - Checkout and billing portal sessions
//! - Subscription reads
//!
//! Webhook signature verification lives in `domain::billing`; it needs only
//! the signing secret, not an HTTP client.

mod api_types;
mod mock_payment_provider;
mod stripe_adapter;

pub use mock_payment_provider::{MethodCall, MockPaymentProvider};
pub use stripe_adapter::{StripeConfig, StripePaymentAdapter};
