//! Registration scheduler that only records what was scheduled.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{BotIntegrationId, DomainError};
use crate::ports::RegistrationScheduler;

#[derive(Debug, Clone, Default)]
pub struct RecordingRegistrationScheduler {
    scheduled: Arc<RwLock<Vec<BotIntegrationId>>>,
}

impl RecordingRegistrationScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn scheduled(&self) -> Vec<BotIntegrationId> {
        self.scheduled.read().await.clone()
    }
}

#[async_trait]
impl RegistrationScheduler for RecordingRegistrationScheduler {
    async fn schedule(&self, integration_id: BotIntegrationId) -> Result<(), DomainError> {
        self.scheduled.write().await.push(integration_id);
        Ok(())
    }
}
