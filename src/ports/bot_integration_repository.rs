//! Bot integration repository port.
//!
//! Defines the contract for persisting tenants. Secrets (bot token, routing
//! secret) cross this boundary in plaintext; implementations decide how they
//! are protected at rest.
//!
//! # Design
//!
//! - **Lookup by secret**: inbound Telegram deliveries carry only the routing secret
//! - **Lookup by price**: inbound Stripe events carry only a price id
//! - **Uniqueness**: routing secret and bot token are unique across tenants

use async_trait::async_trait;

use crate::domain::foundation::{BotIntegrationId, DomainError};
use crate::domain::integration::BotIntegration;

/// Repository port for bot tenants.
#[async_trait]
pub trait BotIntegrationRepository: Send + Sync {
    /// Persist a new tenant.
    ///
    /// # Errors
    ///
    /// - `Conflict` if the routing secret or bot token is already stored
    /// - `DatabaseError` on persistence failure
    async fn insert(&self, integration: &BotIntegration) -> Result<(), DomainError>;

    /// Overwrite an existing tenant.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the tenant doesn't exist
    /// - `Conflict` if the new bot token belongs to another tenant
    async fn update(&self, integration: &BotIntegration) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &BotIntegrationId)
        -> Result<Option<BotIntegration>, DomainError>;

    /// Active tenant owning the routing secret.
    async fn find_active_by_routing_secret(
        &self,
        routing_secret: &str,
    ) -> Result<Option<BotIntegration>, DomainError>;

    /// First active tenant, in creation order, whose price set contains `price_id`.
    async fn find_active_by_price(
        &self,
        price_id: &str,
    ) -> Result<Option<BotIntegration>, DomainError>;

    /// Active tenants in creation order.
    async fn list_active(&self) -> Result<Vec<BotIntegration>, DomainError>;

    async fn routing_secret_exists(&self, routing_secret: &str) -> Result<bool, DomainError>;

    /// Whether another tenant (not `excluding`) already uses `bot_token`.
    async fn bot_token_in_use(
        &self,
        bot_token: &str,
        excluding: Option<&BotIntegrationId>,
    ) -> Result<bool, DomainError>;
}
