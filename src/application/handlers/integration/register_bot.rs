//! RegisterBotHandler - background job that points a tenant's bot at this service.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::conversation::BotCommand;
use crate::domain::foundation::{BotIntegrationId, DomainError};
use crate::domain::integration::{BotIntegration, Locale};
use crate::ports::{
    BotApi, BotApiError, BotApiFactory, BotCommandSpec, BotIntegrationRepository, MessageCatalog,
    MessageKey, SetWebhook,
};

/// Update kinds the conversation router handles.
pub const ALLOWED_UPDATES: [&str; 2] = ["message", "callback_query"];

/// Command to register one tenant's bot.
#[derive(Debug, Clone, Copy)]
pub struct RegisterBotCommand {
    pub integration_id: BotIntegrationId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterBotResult {
    Registered,
    /// Tenant was deactivated after the job was scheduled.
    SkippedInactive,
}

#[derive(Debug, Error)]
pub enum RegisterBotError {
    #[error("Bot integration not found")]
    NotFound,
    #[error(transparent)]
    Store(#[from] DomainError),
    #[error("setWebhook failed: {0}")]
    Webhook(#[from] BotApiError),
}

/// Sets the command menu and webhook for a tenant's bot.
///
/// Safe to run repeatedly. Only a failed `setWebhook` is an error; the
/// scheduler retries on error.
pub struct RegisterBotHandler {
    repository: Arc<dyn BotIntegrationRepository>,
    bots: Arc<dyn BotApiFactory>,
    catalog: Arc<dyn MessageCatalog>,
    webhook_url: String,
}

impl RegisterBotHandler {
    pub fn new(
        repository: Arc<dyn BotIntegrationRepository>,
        bots: Arc<dyn BotApiFactory>,
        catalog: Arc<dyn MessageCatalog>,
        webhook_url: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            bots,
            catalog,
            webhook_url: webhook_url.into(),
        }
    }

    pub async fn handle(
        &self,
        cmd: RegisterBotCommand,
    ) -> Result<RegisterBotResult, RegisterBotError> {
        let integration = self
            .repository
            .find_by_id(&cmd.integration_id)
            .await?
            .ok_or(RegisterBotError::NotFound)?;

        if !integration.active {
            tracing::info!(
                integration_id = %integration.id,
                "Skipping registration of inactive bot integration"
            );
            return Ok(RegisterBotResult::SkippedInactive);
        }

        let bot = self.bots.for_integration(&integration);

        self.set_commands(bot.as_ref(), &integration).await;

        bot.set_webhook(&SetWebhook {
            url: self.webhook_url.clone(),
            secret_token: integration.routing_secret.expose().to_string(),
            allowed_updates: ALLOWED_UPDATES.iter().map(|u| u.to_string()).collect(),
        })
        .await?;

        match bot.get_webhook_info().await {
            Ok(info) => tracing::info!(
                integration_id = %integration.id,
                pending_update_count = info.pending_update_count,
                last_error_date = ?info.last_error_date,
                last_error_message = ?info.last_error_message,
                "Bot webhook registered"
            ),
            Err(e) => tracing::warn!(
                integration_id = %integration.id,
                error = %e,
                "Bot webhook registered but getWebhookInfo failed"
            ),
        }

        Ok(RegisterBotResult::Registered)
    }

    /// One menu per supported locale, then a language-less default.
    async fn set_commands(&self, bot: &dyn BotApi, integration: &BotIntegration) {
        let languages = Locale::ALL.into_iter().map(Some).chain([None]);

        for language in languages {
            let commands = self.command_specs(language.unwrap_or(integration.default_locale));
            if let Err(e) = bot.set_my_commands(&commands, language).await {
                tracing::warn!(
                    integration_id = %integration.id,
                    language = language.map(|l| l.code()).unwrap_or("default"),
                    error = %e,
                    "setMyCommands failed"
                );
            }
        }
    }

    fn command_specs(&self, locale: Locale) -> Vec<BotCommandSpec> {
        BotCommand::ALL
            .iter()
            .map(|command| {
                let key = match command {
                    BotCommand::Start => MessageKey::CommandStartDescription,
                    BotCommand::Status => MessageKey::CommandStatusDescription,
                    BotCommand::Cancel => MessageKey::CommandCancelDescription,
                };
                BotCommandSpec {
                    command: command.name().to_string(),
                    description: self.catalog.text(locale, key),
                }
            })
            .collect()
    }
}
