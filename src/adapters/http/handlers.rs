//! HTTP handlers for the inbound webhooks.
//!
//! These handlers connect Axum routes to the application layer. Status codes
//! follow one rule: an unauthenticated delivery gets 403, a malformed one
//! (including an update without a chat or sender) 400, and everything that
//! got past both is acknowledged with 200 whatever the outcome, so neither
//! Telegram nor Stripe keeps redelivering.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Json, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::application::handlers::conversation::{ConversationRouter, HandleUpdateCommand};
use crate::application::handlers::integration::BotIntegrationRegistry;
use crate::application::handlers::webhook::{
    HandlePaymentWebhookCommand, PaymentWebhookProcessor,
};
use crate::domain::billing::WebhookError;
use crate::domain::conversation::Update;

use super::dto::{ErrorResponse, EventAck, HealthResponse, UpdateAck};

/// Header Telegram echoes the tenant's routing secret in.
pub const TELEGRAM_SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

pub const STRIPE_SIGNATURE_HEADER: &str = "stripe-signature";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state, cloned for each request.
#[derive(Clone)]
pub struct AppState {
    pub registry: BotIntegrationRegistry,
    pub conversations: Arc<ConversationRouter>,
    pub payment_webhooks: Arc<PaymentWebhookProcessor>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /telegram/bots/webhooks - Handle a Telegram update for any tenant
pub async fn handle_telegram_update(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<UpdateAck>, ApiError> {
    let secret = headers
        .get(TELEGRAM_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Forbidden("Missing secret token"))?;

    let integration = state
        .registry
        .resolve_by_routing_secret(secret)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to resolve bot integration");
            ApiError::Unavailable
        })?
        .ok_or(ApiError::Forbidden("Unknown secret token"))?;

    let update: Update = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(integration_id = %integration.id, error = %e, "Malformed Telegram update");
        ApiError::BadRequest(format!("Malformed update: {}", e))
    })?;

    let integration_id = integration.id;
    let update_id = update.update_id;
    let result = state
        .conversations
        .handle(HandleUpdateCommand {
            integration,
            update,
        })
        .await
        .map_err(|e| {
            tracing::warn!(
                integration_id = %integration_id,
                update_id,
                error = %e,
                "Telegram update without chat or sender"
            );
            ApiError::BadRequest(format!("Malformed update: {}", e))
        })?;

    tracing::debug!(
        integration_id = %integration_id,
        update_id,
        result = ?result,
        "Telegram update handled"
    );
    Ok(Json(UpdateAck { ok: true }))
}

/// POST /stripe/bots/webhooks - Handle a Stripe event
pub async fn handle_stripe_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<EventAck>, ApiError> {
    let signature = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let cmd = HandlePaymentWebhookCommand {
        payload: body.to_vec(),
        signature,
    };
    state.payment_webhooks.handle(cmd).await?;

    Ok(Json(EventAck { received: true }))
}

/// GET /health - Liveness probe
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts failures to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    Forbidden(&'static str),
    BadRequest(String),
    Unavailable,
}

impl From<WebhookError> for ApiError {
    fn from(err: WebhookError) -> Self {
        if err.is_auth_failure() {
            tracing::warn!(error = %err, "Rejected Stripe webhook");
            ApiError::Forbidden("Invalid signature")
        } else {
            tracing::warn!(error = %err, "Malformed Stripe webhook");
            ApiError::BadRequest(err.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Forbidden(message) => {
                (StatusCode::FORBIDDEN, ErrorResponse::new("FORBIDDEN", message))
            }
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, ErrorResponse::new("BAD_REQUEST", message))
            }
            ApiError::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorResponse::new("SERVICE_UNAVAILABLE", "Try again later"),
            ),
        };
        (status, Json(body)).into_response()
    }
}
