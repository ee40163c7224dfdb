//! ProcessedEventStore port - idempotency markers for payment webhooks.
//!
//! Stripe redelivers an event until it receives a 2xx, for up to a few days,
//! and may deliver the same event twice concurrently. The store lets the
//! webhook processor run each event's handler at most once per retention
//! window.
//!
//! # Protocol
//!
//! ```ignore
//! match store.try_claim(&event.id, IN_FLIGHT_LEASE).await? {
//!     ClaimOutcome::Claimed => {
//!         // run the handler...
//!         store.mark_processed(&event.id, RETENTION).await?;   // on success
//!         store.release(&event.id).await?;                     // on failure
//!     }
//!     ClaimOutcome::AlreadyProcessed | ClaimOutcome::InFlight => { /* acknowledge */ }
//! }
//! ```

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::foundation::DomainError;

/// Result of trying to claim an event for processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// This caller owns the event until the lease expires.
    Claimed,
    /// A previous delivery was handled within the retention window.
    AlreadyProcessed,
    /// Another delivery is handling the event right now.
    InFlight,
}

/// Port for webhook idempotency markers.
#[async_trait]
pub trait ProcessedEventStore: Send + Sync {
    /// Atomically claims `event_id` unless a claim or marker already exists.
    ///
    /// The claim expires after `lease` so a crashed handler doesn't block redelivery.
    async fn try_claim(&self, event_id: &str, lease: Duration)
        -> Result<ClaimOutcome, DomainError>;

    /// Replaces the claim with a processed marker kept for `retention`.
    async fn mark_processed(&self, event_id: &str, retention: Duration)
        -> Result<(), DomainError>;

    /// Drops an in-flight claim so the next delivery can retry.
    async fn release(&self, event_id: &str) -> Result<(), DomainError>;
}
