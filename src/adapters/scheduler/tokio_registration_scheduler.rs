//! Runs bot registration jobs on the Tokio runtime with exponential backoff.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use crate::application::handlers::integration::{
    RegisterBotCommand, RegisterBotError, RegisterBotHandler, RegisterBotResult,
};
use crate::config::TelegramConfig;
use crate::domain::foundation::{BotIntegrationId, DomainError};
use crate::ports::RegistrationScheduler;

/// How often and how patiently a job is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    /// Delay before the first retry; doubled on every further retry.
    pub base_backoff: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &TelegramConfig) -> Self {
        Self {
            attempts: config.registration_attempts,
            base_backoff: config.registration_backoff(),
        }
    }

    fn delay_after(&self, attempt: u32) -> Duration {
        self.base_backoff
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

/// Fire-and-forget scheduler; each job gets its own task.
pub struct TokioRegistrationScheduler {
    handler: Arc<RegisterBotHandler>,
    policy: RetryPolicy,
}

impl TokioRegistrationScheduler {
    pub fn new(handler: Arc<RegisterBotHandler>, policy: RetryPolicy) -> Self {
        Self { handler, policy }
    }
}

#[async_trait]
impl RegistrationScheduler for TokioRegistrationScheduler {
    async fn schedule(&self, integration_id: BotIntegrationId) -> Result<(), DomainError> {
        let handler = Arc::clone(&self.handler);
        let policy = self.policy;

        tokio::spawn(async move {
            run_with_retry(integration_id, policy, || {
                handler.handle(RegisterBotCommand { integration_id })
            })
            .await
        });

        tracing::debug!(integration_id = %integration_id, "Bot registration scheduled");
        Ok(())
    }
}

/// Runs `job` until it succeeds, fails permanently, or runs out of attempts.
/// Returns whether the job ended successfully.
pub(crate) async fn run_with_retry<F, Fut>(
    integration_id: BotIntegrationId,
    policy: RetryPolicy,
    mut job: F,
) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<RegisterBotResult, RegisterBotError>>,
{
    for attempt in 1..=policy.attempts {
        match job().await {
            Ok(result) => {
                tracing::info!(
                    integration_id = %integration_id,
                    attempt,
                    result = ?result,
                    "Bot registration finished"
                );
                return true;
            }
            Err(RegisterBotError::NotFound) => {
                tracing::warn!(integration_id = %integration_id, "Bot integration vanished before registration");
                return false;
            }
            Err(e) if attempt < policy.attempts => {
                let delay = policy.delay_after(attempt);
                tracing::warn!(
                    integration_id = %integration_id,
                    attempt,
                    retry_in_ms = delay.as_millis() as u64,
                    error = %e,
                    "Bot registration failed, retrying"
                );
                sleep(delay).await;
            }
            Err(e) => {
                tracing::error!(
                    integration_id = %integration_id,
                    attempts = policy.attempts,
                    error = %e,
                    "Bot registration failed, giving up"
                );
            }
        }
    }
    false
}
