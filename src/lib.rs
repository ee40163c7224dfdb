//! Channel Gate - paid access to Telegram channels.
//!
//! Many bot tenants share one service. Each tenant's bot talks to buyers,
//! sends them to Stripe checkout, and adds them to the tenant's private
//! channel once Stripe confirms the payment.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
