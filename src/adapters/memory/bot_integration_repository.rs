//! In-memory tenant store.
//!
//! Keeps tenants in insertion order, which stands in for creation order
//! when resolving a price to its tenant.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{BotIntegrationId, DomainError, ErrorCode};
use crate::domain::integration::BotIntegration;
use crate::ports::BotIntegrationRepository;

#[derive(Debug, Clone, Default)]
pub struct InMemoryBotIntegrationRepository {
    integrations: Arc<RwLock<Vec<BotIntegration>>>,
}

impl InMemoryBotIntegrationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.integrations.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.integrations.read().await.is_empty()
    }
}

fn token_taken(
    integrations: &[BotIntegration],
    bot_token: &str,
    excluding: Option<&BotIntegrationId>,
) -> bool {
    integrations
        .iter()
        .any(|i| Some(&i.id) != excluding && i.bot_token() == bot_token)
}

#[async_trait]
impl BotIntegrationRepository for InMemoryBotIntegrationRepository {
    async fn insert(&self, integration: &BotIntegration) -> Result<(), DomainError> {
        let mut integrations = self.integrations.write().await;

        let secret_taken = integrations
            .iter()
            .any(|i| i.routing_secret.expose() == integration.routing_secret.expose());
        if secret_taken || token_taken(&integrations, integration.bot_token(), None) {
            return Err(DomainError::new(
                ErrorCode::Conflict,
                "Routing secret or bot token already stored",
            ));
        }

        integrations.push(integration.clone());
        Ok(())
    }

    async fn update(&self, integration: &BotIntegration) -> Result<(), DomainError> {
        let mut integrations = self.integrations.write().await;

        if token_taken(&integrations, integration.bot_token(), Some(&integration.id)) {
            return Err(DomainError::new(
                ErrorCode::Conflict,
                "Bot token belongs to another integration",
            ));
        }

        let slot = integrations
            .iter_mut()
            .find(|i| i.id == integration.id)
            .ok_or_else(|| {
                DomainError::new(ErrorCode::NotFound, "Bot integration not found")
                    .with_detail("integration_id", integration.id.to_string())
            })?;
        *slot = integration.clone();
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &BotIntegrationId,
    ) -> Result<Option<BotIntegration>, DomainError> {
        let integrations = self.integrations.read().await;
        Ok(integrations.iter().find(|i| &i.id == id).cloned())
    }

    async fn find_active_by_routing_secret(
        &self,
        routing_secret: &str,
    ) -> Result<Option<BotIntegration>, DomainError> {
        let integrations = self.integrations.read().await;
        Ok(integrations
            .iter()
            .find(|i| i.active && i.routing_secret.matches(routing_secret))
            .cloned())
    }

    async fn find_active_by_price(
        &self,
        price_id: &str,
    ) -> Result<Option<BotIntegration>, DomainError> {
        let integrations = self.integrations.read().await;
        Ok(integrations
            .iter()
            .find(|i| i.active && i.offers_price(price_id))
            .cloned())
    }

    async fn list_active(&self) -> Result<Vec<BotIntegration>, DomainError> {
        let integrations = self.integrations.read().await;
        Ok(integrations.iter().filter(|i| i.active).cloned().collect())
    }

    async fn routing_secret_exists(&self, routing_secret: &str) -> Result<bool, DomainError> {
        let integrations = self.integrations.read().await;
        Ok(integrations
            .iter()
            .any(|i| i.routing_secret.matches(routing_secret)))
    }

    async fn bot_token_in_use(
        &self,
        bot_token: &str,
        excluding: Option<&BotIntegrationId>,
    ) -> Result<bool, DomainError> {
        let integrations = self.integrations.read().await;
        Ok(token_taken(&integrations, bot_token, excluding))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::integration::{IntegrationSettings, Locale, PriceIds, RoutingSecret};
    use secrecy::SecretString;

    fn integration(token: &str, prices: &[&str], active: bool) -> BotIntegration {
        BotIntegration::new(
            IntegrationSettings {
                name: "Gate".to_string(),
                bot_token: SecretString::new(token.to_string()),
                bot_username: None,
                channel_id: "-1001".to_string(),
                price_ids: PriceIds::from(prices.iter().map(|p| p.to_string()).collect::<Vec<_>>()),
                default_locale: Locale::En,
                offer_text: "Join".to_string(),
                active,
            },
            RoutingSecret::generate(),
        )
    }

    #[tokio::test]
    async fn resolves_active_tenant_by_secret() {
        let repo = InMemoryBotIntegrationRepository::new();
        let tenant = integration("1:a", &["price_1"], true);
        repo.insert(&tenant).await.unwrap();

        let found = repo
            .find_active_by_routing_secret(tenant.routing_secret.expose())
            .await
            .unwrap();

        assert_eq!(found.map(|t| t.id), Some(tenant.id));
        assert!(repo.find_active_by_routing_secret("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn inactive_tenant_is_invisible_to_lookups() {
        let repo = InMemoryBotIntegrationRepository::new();
        let tenant = integration("1:a", &["price_1"], false);
        repo.insert(&tenant).await.unwrap();

        assert!(repo
            .find_active_by_routing_secret(tenant.routing_secret.expose())
            .await
            .unwrap()
            .is_none());
        assert!(repo.find_active_by_price("price_1").await.unwrap().is_none());
        assert!(repo.find_by_id(&tenant.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn price_resolves_to_first_created_tenant() {
        let repo = InMemoryBotIntegrationRepository::new();
        let first = integration("1:a", &["price_shared"], true);
        let second = integration("2:b", &["price_shared", "price_2"], true);
        repo.insert(&first).await.unwrap();
        repo.insert(&second).await.unwrap();

        let found = repo.find_active_by_price("price_shared").await.unwrap().unwrap();
        assert_eq!(found.id, first.id);
    }

    #[tokio::test]
    async fn list_active_keeps_creation_order() {
        let repo = InMemoryBotIntegrationRepository::new();
        let first = integration("1:a", &["p1"], true);
        let paused = integration("2:b", &["p2"], false);
        let third = integration("3:c", &["p3"], true);
        for tenant in [&first, &paused, &third] {
            repo.insert(tenant).await.unwrap();
        }

        let ids: Vec<_> = repo.list_active().await.unwrap().into_iter().map(|t| t.id).collect();

        assert_eq!(ids, vec![first.id, third.id]);
    }

    #[tokio::test]
    async fn duplicate_token_is_conflict() {
        let repo = InMemoryBotIntegrationRepository::new();
        repo.insert(&integration("1:a", &["p"], true)).await.unwrap();

        let err = repo.insert(&integration("1:a", &["p"], true)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn token_in_use_excludes_self() {
        let repo = InMemoryBotIntegrationRepository::new();
        let tenant = integration("1:a", &["p"], true);
        repo.insert(&tenant).await.unwrap();

        assert!(repo.bot_token_in_use("1:a", None).await.unwrap());
        assert!(!repo.bot_token_in_use("1:a", Some(&tenant.id)).await.unwrap());
    }

    #[tokio::test]
    async fn update_unknown_is_not_found() {
        let repo = InMemoryBotIntegrationRepository::new();
        let err = repo.update(&integration("1:a", &["p"], true)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
