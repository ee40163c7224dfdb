//! CreateBotIntegrationHandler - Command handler for adding a tenant.

use std::sync::Arc;

use secrecy::ExposeSecret;

use crate::domain::integration::{BotIntegration, IntegrationError, RoutingSecret};
use crate::ports::{BotApiFactory, BotIntegrationRepository, RegistrationScheduler};

use super::input::IntegrationInput;

/// Attempts at drawing a routing secret that no tenant uses yet.
const MAX_SECRET_ATTEMPTS: usize = 5;

/// Command to create a new tenant.
#[derive(Debug, Clone)]
pub struct CreateBotIntegrationCommand {
    pub input: IntegrationInput,
}

/// Result of successful tenant creation.
#[derive(Debug, Clone)]
pub struct CreateBotIntegrationResult {
    pub integration: BotIntegration,
    pub registration_scheduled: bool,
}

/// Handler for creating tenants.
///
/// Generates the routing secret, fills in the bot handle from Telegram when
/// the administrator left it out, and schedules bot registration for active
/// tenants.
pub struct CreateBotIntegrationHandler {
    repository: Arc<dyn BotIntegrationRepository>,
    bots: Arc<dyn BotApiFactory>,
    scheduler: Arc<dyn RegistrationScheduler>,
}

impl CreateBotIntegrationHandler {
    pub fn new(
        repository: Arc<dyn BotIntegrationRepository>,
        bots: Arc<dyn BotApiFactory>,
        scheduler: Arc<dyn RegistrationScheduler>,
    ) -> Self {
        Self {
            repository,
            bots,
            scheduler,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateBotIntegrationCommand,
    ) -> Result<CreateBotIntegrationResult, IntegrationError> {
        // 1. Validate and normalize
        let settings = cmd.input.validate()?;

        // 2. One tenant per bot
        if self
            .repository
            .bot_token_in_use(settings.bot_token.expose_secret(), None)
            .await?
        {
            return Err(IntegrationError::BotTokenInUse);
        }

        // 3. Routing secret, never reused
        let routing_secret = self.unused_routing_secret().await?;
        let mut integration = BotIntegration::new(settings, routing_secret);

        // 4. Bot handle from Telegram when not given
        if integration.bot_username.is_none() {
            integration.bot_username = self.lookup_bot_username(&integration).await;
        }

        // 5. Persist
        self.repository.insert(&integration).await?;

        tracing::info!(
            integration_id = %integration.id,
            active = integration.active,
            price_count = integration.price_ids.len(),
            "Bot integration created"
        );

        // 6. Register with Telegram in the background
        let registration_scheduled = integration.active && self.schedule(&integration).await;

        Ok(CreateBotIntegrationResult {
            integration,
            registration_scheduled,
        })
    }

    async fn unused_routing_secret(&self) -> Result<RoutingSecret, IntegrationError> {
        for _ in 0..MAX_SECRET_ATTEMPTS {
            let candidate = RoutingSecret::generate();
            if !self
                .repository
                .routing_secret_exists(candidate.expose())
                .await?
            {
                return Ok(candidate);
            }
        }
        Err(IntegrationError::RoutingSecretExhausted)
    }

    async fn lookup_bot_username(&self, integration: &BotIntegration) -> Option<String> {
        match self.bots.for_integration(integration).get_me().await {
            Ok(me) => me.username,
            Err(e) => {
                tracing::warn!(error = %e, "Could not fetch bot username");
                None
            }
        }
    }

    async fn schedule(&self, integration: &BotIntegration) -> bool {
        match self.scheduler.schedule(integration.id).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(
                    integration_id = %integration.id,
                    error = %e,
                    "Failed to schedule bot registration"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryBotIntegrationRepository, RecordingRegistrationScheduler};
    use crate::adapters::telegram::{MockBotApi, MockBotApiFactory};
    use crate::domain::foundation::{BotIntegrationId, DomainError, ValidationError};
    use crate::domain::integration::PriceIdsInput;
    use crate::ports::BotApiError;
    use async_trait::async_trait;
    use std::collections::HashSet;

    // ════════════════════════════════════════════════════════════════════════════
    // Test Helpers
    // ════════════════════════════════════════════════════════════════════════════

    struct Fixture {
        repository: Arc<InMemoryBotIntegrationRepository>,
        bot: MockBotApi,
        scheduler: Arc<RecordingRegistrationScheduler>,
        handler: CreateBotIntegrationHandler,
    }

    fn fixture() -> Fixture {
        let repository = Arc::new(InMemoryBotIntegrationRepository::new());
        let bot = MockBotApi::new();
        let scheduler = Arc::new(RecordingRegistrationScheduler::new());
        let handler = CreateBotIntegrationHandler::new(
            repository.clone(),
            Arc::new(MockBotApiFactory::new(bot.clone())),
            scheduler.clone(),
        );
        Fixture {
            repository,
            bot,
            scheduler,
            handler,
        }
    }

    fn input(token: &str) -> IntegrationInput {
        IntegrationInput {
            name: "Premium Signals".to_string(),
            bot_token: token.to_string(),
            bot_username: None,
            channel_id: "-1001234567890".to_string(),
            price_ids: PriceIdsInput::Text("price_monthly,price_lifetime".to_string()),
            default_locale: "en".to_string(),
            offer_text: "<b>Join</b>".to_string(),
            active: true,
        }
    }

    fn command(token: &str) -> CreateBotIntegrationCommand {
        CreateBotIntegrationCommand {
            input: input(token),
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Success Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn creates_and_schedules_active_tenant() {
        let f = fixture();

        let result = f.handler.handle(command("111:aaa")).await.unwrap();

        assert!(result.registration_scheduled);
        assert_eq!(f.repository.len().await, 1);
        assert_eq!(f.scheduler.scheduled().await, vec![result.integration.id]);
        assert_eq!(result.integration.routing_secret.expose().len(), 32);
    }

    #[tokio::test]
    async fn fills_bot_username_from_telegram() {
        let f = fixture();
        f.bot.set_bot_username(Some("signals_bot"));

        let result = f.handler.handle(command("111:aaa")).await.unwrap();

        assert_eq!(result.integration.bot_username.as_deref(), Some("signals_bot"));
        assert_eq!(f.bot.call_count("getMe"), 1);
    }

    #[tokio::test]
    async fn given_username_skips_telegram_lookup() {
        let f = fixture();
        let mut cmd = command("111:aaa");
        cmd.input.bot_username = Some("@given_bot".to_string());

        let result = f.handler.handle(cmd).await.unwrap();

        assert_eq!(result.integration.bot_username.as_deref(), Some("given_bot"));
        assert_eq!(f.bot.call_count("getMe"), 0);
    }

    #[tokio::test]
    async fn username_lookup_failure_is_tolerated() {
        let f = fixture();
        f.bot
            .set_failure("getMe", BotApiError::api(401, "Unauthorized"));

        let result = f.handler.handle(command("111:aaa")).await.unwrap();

        assert_eq!(result.integration.bot_username, None);
        assert_eq!(f.repository.len().await, 1);
    }

    #[tokio::test]
    async fn inactive_tenant_is_not_scheduled() {
        let f = fixture();
        let mut cmd = command("111:aaa");
        cmd.input.active = false;

        let result = f.handler.handle(cmd).await.unwrap();

        assert!(!result.registration_scheduled);
        assert!(f.scheduler.scheduled().await.is_empty());
    }

    #[tokio::test]
    async fn routing_secrets_are_unique_across_tenants() {
        let f = fixture();
        let mut secrets = HashSet::new();

        for n in 0..40 {
            let result = f.handler.handle(command(&format!("{}:tok", n))).await.unwrap();
            secrets.insert(result.integration.routing_secret.expose().to_string());
        }

        assert_eq!(secrets.len(), 40);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Failure Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn rejects_invalid_input() {
        let f = fixture();
        let mut cmd = command("111:aaa");
        cmd.input.price_ids = PriceIdsInput::List(vec![]);

        let err = f.handler.handle(cmd).await.unwrap_err();

        assert!(matches!(
            err,
            IntegrationError::Invalid(ValidationError::EmptyField { .. })
        ));
        assert!(f.repository.is_empty().await);
    }

    #[tokio::test]
    async fn rejects_token_used_by_another_tenant() {
        let f = fixture();
        f.handler.handle(command("111:aaa")).await.unwrap();

        let err = f.handler.handle(command("111:aaa")).await.unwrap_err();

        assert!(matches!(err, IntegrationError::BotTokenInUse));
        assert_eq!(f.repository.len().await, 1);
    }

    struct SaturatedRepository;

    #[async_trait]
    impl BotIntegrationRepository for SaturatedRepository {
        async fn insert(&self, _integration: &BotIntegration) -> Result<(), DomainError> {
            Ok(())
        }

        async fn update(&self, _integration: &BotIntegration) -> Result<(), DomainError> {
            Ok(())
        }

        async fn find_by_id(
            &self,
            _id: &BotIntegrationId,
        ) -> Result<Option<BotIntegration>, DomainError> {
            Ok(None)
        }

        async fn find_active_by_routing_secret(
            &self,
            _routing_secret: &str,
        ) -> Result<Option<BotIntegration>, DomainError> {
            Ok(None)
        }

        async fn find_active_by_price(
            &self,
            _price_id: &str,
        ) -> Result<Option<BotIntegration>, DomainError> {
            Ok(None)
        }

        async fn list_active(&self) -> Result<Vec<BotIntegration>, DomainError> {
            Ok(Vec::new())
        }

        async fn routing_secret_exists(&self, _routing_secret: &str) -> Result<bool, DomainError> {
            Ok(true)
        }

        async fn bot_token_in_use(
            &self,
            _bot_token: &str,
            _excluding: Option<&BotIntegrationId>,
        ) -> Result<bool, DomainError> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn gives_up_when_every_secret_is_taken() {
        let handler = CreateBotIntegrationHandler::new(
            Arc::new(SaturatedRepository),
            Arc::new(MockBotApiFactory::default()),
            Arc::new(RecordingRegistrationScheduler::new()),
        );

        let err = handler.handle(command("111:aaa")).await.unwrap_err();

        assert!(matches!(err, IntegrationError::RoutingSecretExhausted));
    }
}
