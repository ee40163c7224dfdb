//! Errors raised while authenticating and decoding a Stripe webhook delivery.

use thiserror::Error;

/// Errors that occur before a webhook event reaches a handler.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The Stripe-Signature header was absent.
    #[error("Missing signature header")]
    MissingSignature,

    /// The Stripe-Signature header could not be parsed.
    #[error("Malformed signature header: {0}")]
    MalformedSignatureHeader(String),

    /// Webhook signature verification failed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Webhook timestamp is outside the acceptable window (5 minutes).
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Event timestamp is in the future beyond clock skew tolerance.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// The signed body is not a Stripe event.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// A test-mode event reached a deployment that only accepts live events.
    #[error("Test mode event rejected")]
    TestModeEvent,
}

impl WebhookError {
    /// True when the sender could not be authenticated.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            WebhookError::MissingSignature
                | WebhookError::MalformedSignatureHeader(_)
                | WebhookError::InvalidSignature
                | WebhookError::TimestampOutOfRange
                | WebhookError::InvalidTimestamp
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_signature_displays_correctly() {
        let err = WebhookError::InvalidSignature;
        assert_eq!(format!("{}", err), "Invalid signature");
    }

    #[test]
    fn malformed_payload_displays_message() {
        let err = WebhookError::MalformedPayload("invalid JSON".to_string());
        assert_eq!(format!("{}", err), "Malformed payload: invalid JSON");
    }

    #[test]
    fn signature_problems_are_auth_failures() {
        assert!(WebhookError::MissingSignature.is_auth_failure());
        assert!(WebhookError::MalformedSignatureHeader("x".into()).is_auth_failure());
        assert!(WebhookError::InvalidSignature.is_auth_failure());
        assert!(WebhookError::TimestampOutOfRange.is_auth_failure());
        assert!(WebhookError::InvalidTimestamp.is_auth_failure());
    }

    #[test]
    fn payload_problems_are_not_auth_failures() {
        assert!(!WebhookError::MalformedPayload("x".into()).is_auth_failure());
        assert!(!WebhookError::TestModeEvent.is_auth_failure());
    }
}
