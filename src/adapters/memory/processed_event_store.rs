//! In-memory webhook idempotency markers with the same claim protocol as Redis.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::DomainError;
use crate::ports::{ClaimOutcome, ProcessedEventStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    InFlight,
    Processed,
}

#[derive(Debug, Default)]
struct StoreState {
    markers: HashMap<String, (Marker, Instant)>,
    unavailable: bool,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryProcessedEventStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryProcessedEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every call fail, as if the backing store were down.
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.state.write().await.unavailable = unavailable;
    }

    pub async fn is_processed(&self, event_id: &str) -> bool {
        let state = self.state.read().await;
        matches!(
            state.markers.get(event_id),
            Some((Marker::Processed, expires)) if *expires > Instant::now()
        )
    }

    pub async fn is_in_flight(&self, event_id: &str) -> bool {
        let state = self.state.read().await;
        matches!(
            state.markers.get(event_id),
            Some((Marker::InFlight, expires)) if *expires > Instant::now()
        )
    }
}

fn check_available(state: &StoreState) -> Result<(), DomainError> {
    if state.unavailable {
        return Err(DomainError::cache("marker store unavailable"));
    }
    Ok(())
}

#[async_trait]
impl ProcessedEventStore for InMemoryProcessedEventStore {
    async fn try_claim(
        &self,
        event_id: &str,
        lease: Duration,
    ) -> Result<ClaimOutcome, DomainError> {
        let mut state = self.state.write().await;
        check_available(&state)?;

        let now = Instant::now();
        match state.markers.get(event_id) {
            Some((Marker::Processed, expires)) if *expires > now => {
                Ok(ClaimOutcome::AlreadyProcessed)
            }
            Some((Marker::InFlight, expires)) if *expires > now => Ok(ClaimOutcome::InFlight),
            _ => {
                state
                    .markers
                    .insert(event_id.to_string(), (Marker::InFlight, now + lease));
                Ok(ClaimOutcome::Claimed)
            }
        }
    }

    async fn mark_processed(
        &self,
        event_id: &str,
        retention: Duration,
    ) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        check_available(&state)?;
        state.markers.insert(
            event_id.to_string(),
            (Marker::Processed, Instant::now() + retention),
        );
        Ok(())
    }

    async fn release(&self, event_id: &str) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        check_available(&state)?;
        if matches!(state.markers.get(event_id), Some((Marker::InFlight, _))) {
            state.markers.remove(event_id);
        }
        Ok(())
    }
}
