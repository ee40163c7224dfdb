//! Redis-backed webhook idempotency markers.
//!
//! One key per Stripe event, `stripe_webhook_processed_<event_id>`:
//! 1. `SET key in_flight NX PX <lease>` claims the event atomically
//! 2. `SET key processed EX <retention>` after the handler succeeds
//! 3. A compare-and-delete script drops a failed handler's claim
//!
//! A crashed handler leaves only the short lease behind, so Stripe's next
//! redelivery can retry.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;

use crate::domain::foundation::DomainError;
use crate::ports::{ClaimOutcome, ProcessedEventStore};

const KEY_PREFIX: &str = "stripe_webhook_processed_";
const IN_FLIGHT: &str = "in_flight";
const PROCESSED: &str = "processed";

/// Deletes the key only while it still holds the in-flight claim.
const RELEASE_SCRIPT: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
end
return 0
"#;

pub fn marker_key(event_id: &str) -> String {
    format!("{}{}", KEY_PREFIX, event_id)
}

#[derive(Clone)]
pub struct RedisProcessedEventStore {
    conn: MultiplexedConnection,
}

impl RedisProcessedEventStore {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }
}

fn cache_error(key: &str) -> impl FnOnce(redis::RedisError) -> DomainError + '_ {
    move |e| DomainError::cache(e.to_string()).with_detail("key", key)
}

#[async_trait]
impl ProcessedEventStore for RedisProcessedEventStore {
    async fn try_claim(
        &self,
        event_id: &str,
        lease: Duration,
    ) -> Result<ClaimOutcome, DomainError> {
        let key = marker_key(event_id);
        let mut conn = self.conn.clone();

        // The marker can expire between SET NX and GET; one more round settles it.
        for _ in 0..2 {
            let claimed: Option<String> = redis::cmd("SET")
                .arg(&key)
                .arg(IN_FLIGHT)
                .arg("NX")
                .arg("PX")
                .arg(lease.as_millis().max(1) as u64)
                .query_async(&mut conn)
                .await
                .map_err(cache_error(&key))?;

            if claimed.is_some() {
                return Ok(ClaimOutcome::Claimed);
            }

            let current: Option<String> = redis::cmd("GET")
                .arg(&key)
                .query_async(&mut conn)
                .await
                .map_err(cache_error(&key))?;

            match current.as_deref() {
                Some(PROCESSED) => return Ok(ClaimOutcome::AlreadyProcessed),
                Some(_) => return Ok(ClaimOutcome::InFlight),
                None => continue,
            }
        }

        Ok(ClaimOutcome::InFlight)
    }

    async fn mark_processed(
        &self,
        event_id: &str,
        retention: Duration,
    ) -> Result<(), DomainError> {
        let key = marker_key(event_id);
        let mut conn = self.conn.clone();

        redis::cmd("SET")
            .arg(&key)
            .arg(PROCESSED)
            .arg("EX")
            .arg(retention.as_secs().max(1))
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(cache_error(&key))
    }

    async fn release(&self, event_id: &str) -> Result<(), DomainError> {
        let key = marker_key(event_id);
        let mut conn = self.conn.clone();

        redis::Script::new(RELEASE_SCRIPT)
            .key(&key)
            .arg(IN_FLIGHT)
            .invoke_async::<_, i64>(&mut conn)
            .await
            .map(|_| ())
            .map_err(cache_error(&key))
    }
}

impl std::fmt::Debug for RedisProcessedEventStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisProcessedEventStore").finish_non_exhaustive()
    }
}
