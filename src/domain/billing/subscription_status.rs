//! Entitlement classification over a user's Stripe subscriptions.

use std::cmp::Reverse;
use std::ops::ControlFlow;

use super::objects::{Customer, Subscription, SubscriptionState};

/// The customer/subscription pair that backs an entitlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entitlement {
    pub customer_id: String,
    pub subscription_id: String,
}

/// Where a user stands, computed fresh on every inquiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionStatus {
    /// Entitled now and renewing.
    Active(Entitlement),
    /// Entitled now, scheduled to end.
    Expiring {
        entitlement: Entitlement,
        ends_at: Option<i64>,
    },
    /// Previously entitled, no longer.
    Cancelled {
        entitlement: Entitlement,
        ends_at: Option<i64>,
    },
    /// No matching customer or subscription.
    None,
    /// Stripe could not be queried.
    Error,
}

impl SubscriptionStatus {
    pub fn entitlement(&self) -> Option<&Entitlement> {
        match self {
            SubscriptionStatus::Active(entitlement)
            | SubscriptionStatus::Expiring { entitlement, .. }
            | SubscriptionStatus::Cancelled { entitlement, .. } => Some(entitlement),
            SubscriptionStatus::None | SubscriptionStatus::Error => None,
        }
    }
}

/// Sorts customers so the scan visits them in a stable order.
pub fn order_customers(customers: &mut [Customer]) {
    customers.sort_by(|a, b| a.id.cmp(&b.id));
}

/// Newest subscription first, id as tie-breaker.
pub fn order_subscriptions(subscriptions: &mut [Subscription]) {
    subscriptions.sort_by(|a, b| {
        Reverse(a.created)
            .cmp(&Reverse(b.created))
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Incremental scan over customers' subscriptions.
///
/// An active subscription ends the scan. Otherwise the first trialing and
/// the first lapsed subscription are remembered, and the final verdict
/// applies active > trialing > lapsed > none.
#[derive(Debug, Default)]
pub struct SubscriptionScan {
    active: Option<(String, Subscription)>,
    trialing: Option<(String, Subscription)>,
    lapsed: Option<(String, Subscription)>,
}

impl SubscriptionScan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one customer's subscriptions, already ordered.
    pub fn observe(&mut self, customer_id: &str, subscriptions: &[Subscription]) -> ControlFlow<()> {
        for subscription in subscriptions {
            match subscription.status {
                SubscriptionState::Active => {
                    self.active = Some((customer_id.to_string(), subscription.clone()));
                    return ControlFlow::Break(());
                }
                SubscriptionState::Trialing if self.trialing.is_none() => {
                    self.trialing = Some((customer_id.to_string(), subscription.clone()));
                }
                state if state.is_lapsed() && self.trialing.is_none() && self.lapsed.is_none() => {
                    self.lapsed = Some((customer_id.to_string(), subscription.clone()));
                }
                _ => {}
            }
        }
        ControlFlow::Continue(())
    }

    pub fn finish(self) -> SubscriptionStatus {
        if let Some((customer_id, subscription)) = self.active {
            return renewing_or_expiring(customer_id, subscription);
        }
        if let Some((customer_id, subscription)) = self.trialing {
            return SubscriptionStatus::Active(Entitlement {
                customer_id,
                subscription_id: subscription.id,
            });
        }
        match self.lapsed {
            Some((customer_id, subscription)) => SubscriptionStatus::Cancelled {
                ends_at: subscription
                    .cancel_at
                    .or(subscription.current_period_end)
                    .or(subscription.ended_at),
                entitlement: Entitlement {
                    customer_id,
                    subscription_id: subscription.id,
                },
            },
            None => SubscriptionStatus::None,
        }
    }
}

/// Only the period-end cancellation flag marks an active subscription as expiring.
fn renewing_or_expiring(customer_id: String, subscription: Subscription) -> SubscriptionStatus {
    let entitlement = Entitlement {
        customer_id,
        subscription_id: subscription.id,
    };
    if subscription.cancel_at_period_end {
        SubscriptionStatus::Expiring {
            entitlement,
            ends_at: subscription.current_period_end,
        }
    } else {
        SubscriptionStatus::Active(entitlement)
    }
}
