//! Axum router configuration.

use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{handle_stripe_event, handle_telegram_update, health, AppState};

/// Create the complete application router.
///
/// # Routes
/// - `POST /telegram/bots/webhooks` - Telegram updates, tenant chosen by secret header
/// - `POST /stripe/bots/webhooks` - Stripe events, verified by signature
/// - `GET /health` - Liveness probe
pub fn router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/telegram/bots/webhooks", post(handle_telegram_update))
        .route("/stripe/bots/webhooks", post(handle_stripe_event))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}
