//! Stripe webhook event envelope and the closed set of events the gate reacts to.

use serde::{Deserialize, Serialize};

use super::objects::{CheckoutSession, Invoice, Subscription};

/// Stripe webhook event (simplified).
///
/// Contains the essential fields needed for webhook processing.
/// Additional fields from Stripe's full event schema are ignored.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEvent {
    /// Unique identifier for the event (evt_xxx format).
    pub id: String,

    /// Type of event (e.g., "invoice.paid").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Time at which the event was created (Unix timestamp).
    #[serde(default)]
    pub created: i64,

    /// Object containing event-specific data.
    pub data: StripeEventData,

    /// Whether this is a live mode event (vs test mode).
    #[serde(default)]
    pub livemode: bool,

    /// API version used to render this event.
    pub api_version: Option<String>,
}

/// Container for event-specific data.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEventData {
    /// The object that triggered the event (polymorphic based on event type).
    pub object: serde_json::Value,
}

impl StripeEvent {
    /// Returns true if this is a live mode event.
    pub fn is_live(&self) -> bool {
        self.livemode
    }

    /// Attempts to deserialize the data object as the specified type.
    pub fn deserialize_object<T: serde::de::DeserializeOwned>(
        &self,
    ) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data.object.clone())
    }
}

/// Events that can lead to channel access, plus a fallthrough for the rest.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentEvent {
    /// `customer.subscription.created` / `customer.subscription.updated`
    SubscriptionChanged(Subscription),
    /// `checkout.session.completed`
    CheckoutSessionCompleted(CheckoutSession),
    /// `invoice.paid` / `invoice.payment_succeeded`
    InvoicePaid(Invoice),
    /// Any other event type; acknowledged without action.
    Unhandled(String),
}

impl PaymentEvent {
    /// Types the data object according to the event type.
    ///
    /// # Errors
    ///
    /// Fails when a recognized event carries an object that does not match
    /// the expected shape.
    pub fn from_event(event: &StripeEvent) -> Result<Self, serde_json::Error> {
        Ok(match event.event_type.as_str() {
            "customer.subscription.created" | "customer.subscription.updated" => {
                PaymentEvent::SubscriptionChanged(event.deserialize_object()?)
            }
            "checkout.session.completed" => {
                PaymentEvent::CheckoutSessionCompleted(event.deserialize_object()?)
            }
            "invoice.paid" | "invoice.payment_succeeded" => {
                PaymentEvent::InvoicePaid(event.deserialize_object()?)
            }
            other => PaymentEvent::Unhandled(other.to_string()),
        })
    }
}
