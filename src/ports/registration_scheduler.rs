//! RegistrationScheduler port - background bot registration.
//!
//! Registering a bot (command menu + webhook URL) takes several Telegram
//! round trips, so tenant writes only enqueue it. Implementations retry
//! failed jobs; the job itself is safe to repeat.

use async_trait::async_trait;

use crate::domain::foundation::{BotIntegrationId, DomainError};

#[async_trait]
pub trait RegistrationScheduler: Send + Sync {
    /// Enqueues registration for the tenant and returns immediately.
    async fn schedule(&self, integration_id: BotIntegrationId) -> Result<(), DomainError>;
}
