//! BotIntegrationRegistry - read-only tenant lookups for inbound traffic.

use std::sync::Arc;

use crate::domain::foundation::DomainError;
use crate::domain::integration::BotIntegration;
use crate::ports::BotIntegrationRepository;

/// Resolves the tenant that owns an inbound delivery.
///
/// Only active tenants are ever returned.
#[derive(Clone)]
pub struct BotIntegrationRegistry {
    repository: Arc<dyn BotIntegrationRepository>,
}

impl BotIntegrationRegistry {
    pub fn new(repository: Arc<dyn BotIntegrationRepository>) -> Self {
        Self { repository }
    }

    /// Tenant for a Telegram delivery, keyed by the secret token header.
    pub async fn resolve_by_routing_secret(
        &self,
        routing_secret: &str,
    ) -> Result<Option<BotIntegration>, DomainError> {
        let routing_secret = routing_secret.trim();
        if routing_secret.is_empty() {
            return Ok(None);
        }
        self.repository
            .find_active_by_routing_secret(routing_secret)
            .await
    }

    /// First tenant, in creation order, selling `price_id`.
    pub async fn resolve_by_price(
        &self,
        price_id: &str,
    ) -> Result<Option<BotIntegration>, DomainError> {
        if price_id.trim().is_empty() {
            return Ok(None);
        }
        self.repository.find_active_by_price(price_id).await
    }
}
