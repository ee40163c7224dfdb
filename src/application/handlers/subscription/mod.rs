//! Subscription handlers.

mod resolve_subscription;

pub use resolve_subscription::SubscriptionResolver;
