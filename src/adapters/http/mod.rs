//! HTTP adapter - inbound webhooks from Telegram and Stripe.
//!
//! - `POST /telegram/bots/webhooks` - Updates for every tenant's bot
//! - `POST /stripe/bots/webhooks` - Payment events
//! - `GET /health` - Liveness probe

pub mod dto;
mod handlers;
mod routes;

pub use handlers::{AppState, ApiError, STRIPE_SIGNATURE_HEADER, TELEGRAM_SECRET_HEADER};
pub use routes::router;
