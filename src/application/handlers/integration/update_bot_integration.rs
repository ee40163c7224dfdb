//! UpdateBotIntegrationHandler - Command handler for editing a tenant.

use std::sync::Arc;

use secrecy::ExposeSecret;

use crate::domain::foundation::BotIntegrationId;
use crate::domain::integration::{BotIntegration, IntegrationError};
use crate::ports::{BotApiFactory, BotIntegrationRepository, RegistrationScheduler};

use super::input::IntegrationInput;

/// Command to replace a tenant's editable fields.
#[derive(Debug, Clone)]
pub struct UpdateBotIntegrationCommand {
    pub integration_id: BotIntegrationId,
    pub input: IntegrationInput,
}

#[derive(Debug, Clone)]
pub struct UpdateBotIntegrationResult {
    pub integration: BotIntegration,
    pub registration_scheduled: bool,
}

/// Handler for editing tenants.
///
/// The routing secret is kept as generated at creation. Registration is
/// rescheduled whenever the tenant is active after the edit, since the bot
/// token may have changed.
pub struct UpdateBotIntegrationHandler {
    repository: Arc<dyn BotIntegrationRepository>,
    bots: Arc<dyn BotApiFactory>,
    scheduler: Arc<dyn RegistrationScheduler>,
}

impl UpdateBotIntegrationHandler {
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
        cmd: UpdateBotIntegrationCommand,
    ) -> Result<UpdateBotIntegrationResult, IntegrationError> {
        let mut integration = self
            .repository
            .find_by_id(&cmd.integration_id)
            .await?
            .ok_or(IntegrationError::NotFound)?;

        let mut settings = cmd.input.validate()?;

        if self
            .repository
            .bot_token_in_use(settings.bot_token.expose_secret(), Some(&integration.id))
            .await?
        {
            return Err(IntegrationError::BotTokenInUse);
        }

        let token_changed = settings.bot_token.expose_secret() != integration.bot_token();
        if settings.bot_username.is_none() && !token_changed {
            settings.bot_username = integration.bot_username.clone();
        }

        integration.apply(settings);

        if integration.bot_username.is_none() {
            integration.bot_username = match self.bots.for_integration(&integration).get_me().await
            {
                Ok(me) => me.username,
                Err(e) => {
                    tracing::warn!(
                        integration_id = %integration.id,
                        error = %e,
                        "Could not fetch bot username"
                    );
                    None
                }
            };
        }

        self.repository.update(&integration).await?;

        tracing::info!(
            integration_id = %integration.id,
            active = integration.active,
            "Bot integration updated"
        );

        let registration_scheduled = if integration.active {
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
        } else {
            false
        };

        Ok(UpdateBotIntegrationResult {
            integration,
            registration_scheduled,
        })
    }
}
