//! Stripe payment provider adapter.
//!
//! Implements the `PaymentProvider` trait against the Stripe REST API with
//! form-encoded requests and basic auth.
//!
//! # Configuration
//!
//! ```ignore
//! let config = StripeConfig::new(api_key).with_base_url("http://127.0.0.1:12111");
//! let adapter = StripePaymentAdapter::new(config);
//! ```

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;

use crate::config::PaymentConfig;
use crate::domain::billing::{
    BillingPortalSession, CheckoutLineItem, CheckoutMode, CheckoutSession, Customer, List,
    Metadata, Price, Subscription,
};
use crate::ports::{CreateCheckoutRequest, PaymentError, PaymentErrorCode, PaymentProvider};

use super::api_types::{error_from_response, metadata_query};

const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Base URL for Stripe API (default: https://api.stripe.com).
    api_base_url: String,
}

impl StripeConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

impl From<&PaymentConfig> for StripeConfig {
    fn from(config: &PaymentConfig) -> Self {
        let stripe = StripeConfig::new(config.stripe_api_key.clone());
        match &config.stripe_api_base_url {
            Some(url) => stripe.with_base_url(url.clone()),
            None => stripe,
        }
    }
}

/// Stripe payment provider adapter.
pub struct StripePaymentAdapter {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripePaymentAdapter {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url, path)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, PaymentError> {
        let response = self
            .http_client
            .get(self.url(path))
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .query(query)
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        Self::decode(path, response).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<T, PaymentError> {
        let response = self
            .http_client
            .post(self.url(path))
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(params)
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        Self::decode(path, response).await
    }

    async fn decode<T: DeserializeOwned>(
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, PaymentError> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let error = error_from_response(status.as_u16(), &error_text);
            if !error.is_not_found() {
                tracing::warn!(
                    path = %path,
                    status = status.as_u16(),
                    code = %error.code,
                    provider_code = ?error.provider_code,
                    "Stripe request failed"
                );
            }
            return Err(error);
        }

        response.json().await.map_err(|e| {
            PaymentError::new(
                PaymentErrorCode::DecodeError,
                format!("Failed to parse Stripe response: {}", e),
            )
        })
    }
}

fn metadata_params(prefix: &str, metadata: &Metadata) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = metadata
        .iter()
        .map(|(key, value)| (format!("{}[{}]", prefix, key), value.clone()))
        .collect();
    params.sort();
    params
}

#[async_trait]
impl PaymentProvider for StripePaymentAdapter {
    async fn retrieve_price(&self, price_id: &str) -> Result<Price, PaymentError> {
        self.get(&format!("/v1/prices/{}", price_id), &[]).await
    }

    async fn search_customers_by_metadata(
        &self,
        key: &str,
        value: &str,
    ) -> Result<Vec<Customer>, PaymentError> {
        let list: List<Customer> = self
            .get(
                "/v1/customers/search",
                &[("query", metadata_query(key, value)), ("limit", "100".to_string())],
            )
            .await?;
        Ok(list.data)
    }

    async fn retrieve_customer(&self, customer_id: &str) -> Result<Customer, PaymentError> {
        self.get(&format!("/v1/customers/{}", customer_id), &[]).await
    }

    async fn create_customer(&self, metadata: Metadata) -> Result<Customer, PaymentError> {
        self.post("/v1/customers", &metadata_params("metadata", &metadata))
            .await
    }

    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let mut params = vec![
            ("mode".to_string(), request.mode.as_str().to_string()),
            ("customer".to_string(), request.customer_id),
            ("line_items[0][price]".to_string(), request.price_id),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
            ("success_url".to_string(), request.success_url),
            ("cancel_url".to_string(), request.cancel_url),
        ];
        params.extend(metadata_params("metadata", &request.metadata));
        if request.mode == CheckoutMode::Subscription {
            if let Some(metadata) = &request.subscription_metadata {
                params.extend(metadata_params("subscription_data[metadata]", metadata));
            }
        }

        self.post("/v1/checkout/sessions", &params).await
    }

    async fn list_checkout_line_items(
        &self,
        session_id: &str,
    ) -> Result<Vec<CheckoutLineItem>, PaymentError> {
        let list: List<CheckoutLineItem> = self
            .get(
                &format!("/v1/checkout/sessions/{}/line_items", session_id),
                &[("limit", "10".to_string())],
            )
            .await?;
        Ok(list.data)
    }

    async fn retrieve_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Subscription, PaymentError> {
        self.get(&format!("/v1/subscriptions/{}", subscription_id), &[])
            .await
    }

    async fn list_subscriptions(
        &self,
        customer_id: &str,
        limit: u32,
    ) -> Result<Vec<Subscription>, PaymentError> {
        let list: List<Subscription> = self
            .get(
                "/v1/subscriptions",
                &[
                    ("customer", customer_id.to_string()),
                    ("status", "all".to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        Ok(list.data)
    }

    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<BillingPortalSession, PaymentError> {
        self.post(
            "/v1/billing_portal/sessions",
            &[
                ("customer".to_string(), customer_id.to_string()),
                ("return_url".to_string(), return_url.to_string()),
            ],
        )
        .await
    }
}
