//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod access;
pub mod checkout;
pub mod conversation;
pub mod integration;
pub mod subscription;
pub mod webhook;

#[cfg(test)]
pub(crate) mod test_support;

pub use access::{ChannelAccessGranter, GrantError, GrantOutcome};
pub use checkout::{CheckoutError, CheckoutInitiator, CheckoutStarted, PlanCatalog};
pub use conversation::{ConversationRouter, HandleUpdateCommand, HandleUpdateResult};
pub use integration::{
    // Registry
    BotIntegrationRegistry,
    // Commands and Results
    CreateBotIntegrationCommand,
    CreateBotIntegrationHandler,
    CreateBotIntegrationResult,
    IntegrationInput,
    RegisterBotCommand,
    RegisterBotError,
    RegisterBotHandler,
    RegisterBotResult,
    UpdateBotIntegrationCommand,
    UpdateBotIntegrationHandler,
    UpdateBotIntegrationResult,
};
pub use subscription::SubscriptionResolver;
pub use webhook::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookResult, PaymentWebhookProcessor, SkipReason,
};
