//! Checkout handlers.
//!
//! - Listing the plans a tenant sells
//! - Opening a Stripe checkout session for a selected plan

mod plan_catalog;
mod start_checkout;

pub use plan_catalog::PlanCatalog;
pub use start_checkout::{bot_deep_link, CheckoutError, CheckoutInitiator, CheckoutStarted};
