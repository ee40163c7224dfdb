//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports:
//! conversations with buyers, checkout, payment webhooks and channel access.

pub mod handlers;

pub use handlers::{
    // Inbound deliveries
    ConversationRouter, HandlePaymentWebhookCommand, HandlePaymentWebhookResult,
    HandleUpdateCommand, HandleUpdateResult, PaymentWebhookProcessor,
    // Tenant administration
    BotIntegrationRegistry, CreateBotIntegrationCommand, CreateBotIntegrationHandler,
    RegisterBotCommand, RegisterBotHandler, UpdateBotIntegrationCommand,
    UpdateBotIntegrationHandler,
};
