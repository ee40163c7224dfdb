//! Payment provider port for Stripe operations.
//!
//! Defines the calls the gate makes against the payment processor: price
//! lookup, customer search/creation, checkout and billing-portal sessions,
//! and subscription reads. Webhook verification is not part of the port;
//! it is pure computation over the signing secret.

use async_trait::async_trait;
use std::fmt;

use crate::domain::billing::{
    BillingPortalSession, CheckoutLineItem, CheckoutMode, CheckoutSession, Customer, Metadata,
    Price, Subscription,
};

/// Port for payment provider integrations.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Retrieve a price by id.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the price doesn't exist
    async fn retrieve_price(&self, price_id: &str) -> Result<Price, PaymentError>;

    /// Customers whose `metadata[key]` equals `value`.
    async fn search_customers_by_metadata(
        &self,
        key: &str,
        value: &str,
    ) -> Result<Vec<Customer>, PaymentError>;

    async fn retrieve_customer(&self, customer_id: &str) -> Result<Customer, PaymentError>;

    async fn create_customer(&self, metadata: Metadata) -> Result<Customer, PaymentError>;

    /// Create a hosted checkout session.
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError>;

    /// Line items of a completed checkout session (not included in webhooks).
    async fn list_checkout_line_items(
        &self,
        session_id: &str,
    ) -> Result<Vec<CheckoutLineItem>, PaymentError>;

    async fn retrieve_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Subscription, PaymentError>;

    /// A customer's subscriptions in every status, at most `limit`.
    async fn list_subscriptions(
        &self,
        customer_id: &str,
        limit: u32,
    ) -> Result<Vec<Subscription>, PaymentError>;

    /// Create a billing portal session for subscription management.
    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<BillingPortalSession, PaymentError>;
}

/// Request to create a checkout session.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateCheckoutRequest {
    pub customer_id: String,
    pub price_id: String,
    pub mode: CheckoutMode,
    /// URL to redirect after successful checkout.
    pub success_url: String,
    /// URL to redirect after abandoned checkout.
    pub cancel_url: String,
    /// Session-level metadata.
    pub metadata: Metadata,
    /// Copied onto the subscription; subscription mode only.
    pub subscription_metadata: Option<Metadata>,
}

/// Errors from payment provider operations.
#[derive(Debug, Clone)]
pub struct PaymentError {
    /// Error code for categorization.
    pub code: PaymentErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Provider's error code (if available).
    pub provider_code: Option<String>,
}

impl PaymentError {
    /// Create a new payment error.
    pub fn new(code: PaymentErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
        }
    }

    /// Create with provider code.
    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::NetworkError, message)
    }

    /// Create a not found error.
    pub fn not_found(resource: &str) -> Self {
        Self::new(PaymentErrorCode::NotFound, format!("{} not found", resource))
    }

    pub fn is_not_found(&self) -> bool {
        self.code == PaymentErrorCode::NotFound
    }
}

impl fmt::Display for PaymentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for PaymentError {}

/// Payment error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentErrorCode {
    /// Network connectivity issue.
    NetworkError,

    /// API authentication failed.
    AuthenticationError,

    /// Resource not found.
    NotFound,

    /// Request rejected as invalid (bad parameters, inactive price).
    InvalidRequest,

    /// Rate limit exceeded.
    RateLimitExceeded,

    /// Response could not be decoded.
    DecodeError,

    /// Provider API error.
    ProviderError,
}

impl PaymentErrorCode {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentErrorCode::NetworkError | PaymentErrorCode::RateLimitExceeded
        )
    }
}

impl fmt::Display for PaymentErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentErrorCode::NetworkError => "network_error",
            PaymentErrorCode::AuthenticationError => "authentication_error",
            PaymentErrorCode::NotFound => "not_found",
            PaymentErrorCode::InvalidRequest => "invalid_request",
            PaymentErrorCode::RateLimitExceeded => "rate_limit_exceeded",
            PaymentErrorCode::DecodeError => "decode_error",
            PaymentErrorCode::ProviderError => "provider_error",
        };
        write!(f, "{}", s)
    }
}
