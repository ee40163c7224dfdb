//! Stripe objects as they appear in API responses and webhook payloads.
//!
//! Only the fields the gate reads are modelled; everything else in
//! Stripe's schema is ignored during deserialization.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Stripe metadata: string keys to string values.
pub type Metadata = HashMap<String, String>;

/// A field that Stripe returns either as a bare id or as the expanded object.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Expandable<T> {
    Id(String),
    Object(Box<T>),
}

impl Expandable<Customer> {
    pub fn id(&self) -> &str {
        match self {
            Expandable::Id(id) => id,
            Expandable::Object(customer) => &customer.id,
        }
    }

    /// The expanded customer, if Stripe sent one.
    pub fn object(&self) -> Option<&Customer> {
        match self {
            Expandable::Id(_) => None,
            Expandable::Object(customer) => Some(customer),
        }
    }
}

/// Paginated Stripe list envelope.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct List<T> {
    pub data: Vec<T>,
}

impl<T> Default for List<T> {
    fn default() -> Self {
        Self { data: Vec::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Recurring {
    pub interval: String,
    #[serde(default = "default_interval_count")]
    pub interval_count: u32,
}

fn default_interval_count() -> u32 {
    1
}

/// A sellable price.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Price {
    pub id: String,
    pub active: bool,
    pub currency: String,
    /// Amount in the currency's minor unit.
    pub unit_amount: Option<i64>,
    pub recurring: Option<Recurring>,
}

impl Price {
    pub fn is_recurring(&self) -> bool {
        self.recurring.is_some()
    }
}

/// Reference to a price inside a line item; the rest of the price is unused.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PriceRef {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Customer {
    pub id: String,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Subscription status as reported by Stripe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionState {
    Active,
    Trialing,
    #[serde(alias = "cancelled")]
    Canceled,
    Unpaid,
    PastDue,
    Incomplete,
    IncompleteExpired,
    Paused,
    #[serde(other)]
    Other,
}

impl SubscriptionState {
    /// States in which the user previously had access but no longer does.
    pub fn is_lapsed(&self) -> bool {
        matches!(
            self,
            SubscriptionState::Canceled | SubscriptionState::Unpaid | SubscriptionState::PastDue
        )
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SubscriptionItem {
    pub price: PriceRef,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Subscription {
    pub id: String,
    pub status: SubscriptionState,
    pub customer: Expandable<Customer>,
    #[serde(default)]
    pub cancel_at_period_end: bool,
    pub current_period_end: Option<i64>,
    pub cancel_at: Option<i64>,
    pub ended_at: Option<i64>,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub items: List<SubscriptionItem>,
}

impl Subscription {
    /// Price of the first subscription item.
    pub fn first_price_id(&self) -> Option<&str> {
        self.items.data.first().map(|item| item.price.id.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SubscriptionDetails {
    #[serde(default)]
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct InvoiceLine {
    #[serde(default)]
    pub metadata: Metadata,
    pub price: Option<PriceRef>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Invoice {
    pub id: String,
    pub paid: Option<bool>,
    pub status: Option<String>,
    pub customer: Option<String>,
    pub subscription: Option<String>,
    pub subscription_details: Option<SubscriptionDetails>,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub lines: List<InvoiceLine>,
}

impl Invoice {
    /// Newer API versions drop `paid` in favour of `status == "paid"`.
    pub fn is_paid(&self) -> bool {
        match self.paid {
            Some(paid) => paid,
            None => self.status.as_deref() == Some("paid"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutMode {
    Payment,
    Subscription,
    Setup,
    #[serde(other)]
    Other,
}

impl CheckoutMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutMode::Payment => "payment",
            CheckoutMode::Subscription => "subscription",
            CheckoutMode::Setup => "setup",
            CheckoutMode::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CheckoutSession {
    pub id: String,
    pub mode: CheckoutMode,
    pub payment_status: Option<String>,
    pub customer: Option<String>,
    /// Hosted checkout page; present while the session is open.
    pub url: Option<String>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl CheckoutSession {
    pub fn is_paid(&self) -> bool {
        self.payment_status.as_deref() == Some("paid")
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CheckoutLineItem {
    pub price: Option<PriceRef>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BillingPortalSession {
    pub url: String,
}
