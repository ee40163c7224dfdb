//! Stripe REST envelopes that are not domain objects.

use serde::Deserialize;

use crate::ports::{PaymentError, PaymentErrorCode};

/// Body of a non-2xx Stripe response.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorBody {
    pub error: StripeApiError,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeApiError {
    #[serde(rename = "type")]
    pub error_type: Option<String>,
    pub code: Option<String>,
    #[serde(default)]
    pub message: String,
}

/// Maps an HTTP status and optional Stripe error body to a `PaymentError`.
pub fn error_from_response(status: u16, body: &str) -> PaymentError {
    let parsed = serde_json::from_str::<StripeErrorBody>(body).ok().map(|b| b.error);
    let provider_code = parsed.as_ref().and_then(|e| e.code.clone());

    let code = match (status, provider_code.as_deref()) {
        (404, _) | (_, Some("resource_missing")) => PaymentErrorCode::NotFound,
        (401, _) | (403, _) => PaymentErrorCode::AuthenticationError,
        (429, _) => PaymentErrorCode::RateLimitExceeded,
        (400, _) | (402, _) => PaymentErrorCode::InvalidRequest,
        _ => PaymentErrorCode::ProviderError,
    };

    let message = match &parsed {
        Some(error) if !error.message.is_empty() => error.message.clone(),
        _ => format!("Stripe API error (HTTP {})", status),
    };

    let error = PaymentError::new(code, message);
    match provider_code {
        Some(provider_code) => error.with_provider_code(provider_code),
        None => error,
    }
}

/// Stripe search query matching one metadata value exactly.
pub fn metadata_query(key: &str, value: &str) -> String {
    format!(
        "metadata['{}']:'{}'",
        key,
        value.replace('\\', "\\\\").replace('\'', "\\'")
    )
}
