//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `stripe` - Stripe REST client and mock
//! - `telegram` - Telegram Bot API client and mock
//! - `postgres` - Tenant persistence
//! - `redis` - Webhook idempotency markers and conversation state
//! - `memory` - In-memory stores for tests and local runs
//! - `crypto` - Sealing of tenant secrets at rest
//! - `scheduler` - Background bot registration
//! - `i18n` - Built-in message catalog
//! - `http` - Axum webhook endpoints

pub mod crypto;
pub mod http;
pub mod i18n;
pub mod memory;
pub mod postgres;
pub mod redis;
pub mod scheduler;
pub mod stripe;
pub mod telegram;
