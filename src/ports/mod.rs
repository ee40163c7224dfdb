//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## External Systems
//!
//! - `PaymentProvider` - Stripe prices, customers, checkout, subscriptions
//! - `BotApi` / `BotApiFactory` - Telegram Bot API, one client per tenant
//!
//! ## Stores
//!
//! - `BotIntegrationRepository` - Tenant persistence
//! - `ProcessedEventStore` - Stripe webhook idempotency markers
//! - `ConversationStateStore` - Ephemeral per-chat waiting state
//!
//! ## Other Collaborators
//!
//! - `MessageCatalog` - Localized texts
//! - `RegistrationScheduler` - Background bot registration

mod bot_api;
mod bot_integration_repository;
mod conversation_state_store;
mod message_catalog;
mod payment_provider;
mod processed_event_store;
mod registration_scheduler;

pub use bot_api::{
    BotApi, BotApiError, BotApiFactory, BotCommandSpec, BotUser, ChatInviteLink, ChatMember,
    SentMessage, SetWebhook, WebhookInfo,
};
pub use bot_integration_repository::BotIntegrationRepository;
pub use conversation_state_store::ConversationStateStore;
pub use message_catalog::{MessageCatalog, MessageKey};
pub use payment_provider::{CreateCheckoutRequest, PaymentError, PaymentErrorCode, PaymentProvider};
pub use processed_event_store::{ClaimOutcome, ProcessedEventStore};
pub use registration_scheduler::RegistrationScheduler;
