//! Integration handlers.
//!
//! ## Commands
//! - Creating and updating bot tenants
//! - Registering a tenant's bot with Telegram (background job)
//!
//! ## Queries
//! - Resolving the tenant behind an inbound delivery

mod create_bot_integration;
mod input;
mod register_bot;
mod registry;
mod update_bot_integration;

pub use create_bot_integration::{
    CreateBotIntegrationCommand, CreateBotIntegrationHandler, CreateBotIntegrationResult,
};
pub use input::IntegrationInput;
pub use register_bot::{
    RegisterBotCommand, RegisterBotError, RegisterBotHandler, RegisterBotResult, ALLOWED_UPDATES,
};
pub use registry::BotIntegrationRegistry;
pub use update_bot_integration::{
    UpdateBotIntegrationCommand, UpdateBotIntegrationHandler, UpdateBotIntegrationResult,
};
