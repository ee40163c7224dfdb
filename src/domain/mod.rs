//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (ids, errors)
//! - `integration` - Bot tenants: settings, routing secrets, locales
//! - `conversation` - Telegram updates, commands, callbacks, keyboards
//! - `billing` - Stripe objects, webhook verification, entitlement rules

pub mod billing;
pub mod conversation;
pub mod foundation;
pub mod integration;
