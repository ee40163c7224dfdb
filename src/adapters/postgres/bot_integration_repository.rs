//! PostgreSQL implementation of BotIntegrationRepository.
//!
//! Bot tokens and routing secrets never touch the table in plaintext: each
//! is stored sealed for reading back, plus a keyed digest that the lookup
//! and uniqueness queries run against.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use sqlx::PgPool;
use uuid::Uuid;

use crate::adapters::crypto::SecretCipher;
use crate::domain::foundation::{BotIntegrationId, DomainError, ErrorCode};
use crate::domain::integration::{BotIntegration, Locale, PriceIds, RoutingSecret};
use crate::ports::BotIntegrationRepository;

const COLUMNS: &str = "id, name, bot_token_sealed, routing_secret_sealed, bot_username, \
                       channel_id, price_ids, default_locale, offer_text, active, \
                       created_at, updated_at";

/// PostgreSQL implementation of the BotIntegrationRepository port.
pub struct PostgresBotIntegrationRepository {
    pool: PgPool,
    cipher: SecretCipher,
}

impl PostgresBotIntegrationRepository {
    pub fn new(pool: PgPool, cipher: SecretCipher) -> Self {
        Self { pool, cipher }
    }

    async fn fetch_one_where(
        &self,
        condition: &str,
        value: &str,
    ) -> Result<Option<BotIntegration>, DomainError> {
        let sql = format!(
            "SELECT {} FROM bot_integrations WHERE {} ORDER BY created_at, id LIMIT 1",
            COLUMNS, condition
        );
        let row: Option<BotIntegrationRow> = sqlx::query_as(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error("Failed to find bot integration", e))?;

        row.map(|row| row.into_integration(&self.cipher)).transpose()
    }
}

/// Database row representation of a bot integration.
#[derive(Debug, sqlx::FromRow)]
struct BotIntegrationRow {
    id: Uuid,
    name: String,
    bot_token_sealed: Vec<u8>,
    routing_secret_sealed: Vec<u8>,
    bot_username: Option<String>,
    channel_id: String,
    price_ids: Vec<String>,
    default_locale: String,
    offer_text: String,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BotIntegrationRow {
    fn into_integration(self, cipher: &SecretCipher) -> Result<BotIntegration, DomainError> {
        let default_locale: Locale = self.default_locale.parse().map_err(|e| {
            DomainError::database(format!("Invalid default_locale value: {}", e))
                .with_detail("integration_id", self.id.to_string())
        })?;

        Ok(BotIntegration {
            id: BotIntegrationId::from_uuid(self.id),
            name: self.name,
            bot_token: SecretString::new(cipher.open(&self.bot_token_sealed)?),
            bot_username: self.bot_username,
            routing_secret: RoutingSecret::from_stored(cipher.open(&self.routing_secret_sealed)?),
            channel_id: self.channel_id,
            price_ids: PriceIds::from(self.price_ids),
            default_locale,
            offer_text: self.offer_text,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn database_error(context: &str, e: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &e {
        if let Some(constraint) = db_err.constraint() {
            if constraint.ends_with("_digest_key") {
                return DomainError::new(
                    ErrorCode::Conflict,
                    "Routing secret or bot token already stored",
                )
                .with_detail("constraint", constraint);
            }
        }
    }
    DomainError::database(format!("{}: {}", context, e))
}

#[async_trait]
impl BotIntegrationRepository for PostgresBotIntegrationRepository {
    async fn insert(&self, integration: &BotIntegration) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO bot_integrations (
                id, name, bot_token_sealed, bot_token_digest, routing_secret_sealed,
                routing_secret_digest, bot_username, channel_id, price_ids, default_locale,
                offer_text, active, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(integration.id.as_uuid())
        .bind(&integration.name)
        .bind(self.cipher.seal(integration.bot_token())?)
        .bind(self.cipher.digest(integration.bot_token()))
        .bind(self.cipher.seal(integration.routing_secret.expose())?)
        .bind(self.cipher.digest(integration.routing_secret.expose()))
        .bind(&integration.bot_username)
        .bind(&integration.channel_id)
        .bind(integration.price_ids.as_slice())
        .bind(integration.default_locale.code())
        .bind(&integration.offer_text)
        .bind(integration.active)
        .bind(integration.created_at)
        .bind(integration.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("Failed to save bot integration", e))?;

        Ok(())
    }

    async fn update(&self, integration: &BotIntegration) -> Result<(), DomainError> {
        // The routing secret is fixed at creation and never rewritten.
        let result = sqlx::query(
            r#"
            UPDATE bot_integrations SET
                name = $2,
                bot_token_sealed = $3,
                bot_token_digest = $4,
                bot_username = $5,
                channel_id = $6,
                price_ids = $7,
                default_locale = $8,
                offer_text = $9,
                active = $10,
                updated_at = $11
            WHERE id = $1
            "#,
        )
        .bind(integration.id.as_uuid())
        .bind(&integration.name)
        .bind(self.cipher.seal(integration.bot_token())?)
        .bind(self.cipher.digest(integration.bot_token()))
        .bind(&integration.bot_username)
        .bind(&integration.channel_id)
        .bind(integration.price_ids.as_slice())
        .bind(integration.default_locale.code())
        .bind(&integration.offer_text)
        .bind(integration.active)
        .bind(integration.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("Failed to update bot integration", e))?;

        if result.rows_affected() == 0 {
            return Err(
                DomainError::new(ErrorCode::NotFound, "Bot integration not found")
                    .with_detail("integration_id", integration.id.to_string()),
            );
        }

        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &BotIntegrationId,
    ) -> Result<Option<BotIntegration>, DomainError> {
        let sql = format!("SELECT {} FROM bot_integrations WHERE id = $1", COLUMNS);
        let row: Option<BotIntegrationRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error("Failed to find bot integration", e))?;

        row.map(|row| row.into_integration(&self.cipher)).transpose()
    }

    async fn find_active_by_routing_secret(
        &self,
        routing_secret: &str,
    ) -> Result<Option<BotIntegration>, DomainError> {
        self.fetch_one_where(
            "active AND routing_secret_digest = $1",
            &self.cipher.digest(routing_secret),
        )
        .await
    }

    async fn find_active_by_price(
        &self,
        price_id: &str,
    ) -> Result<Option<BotIntegration>, DomainError> {
        self.fetch_one_where("active AND $1 = ANY(price_ids)", price_id)
            .await
    }

    async fn list_active(&self) -> Result<Vec<BotIntegration>, DomainError> {
        let sql = format!(
            "SELECT {} FROM bot_integrations WHERE active ORDER BY created_at, id",
            COLUMNS
        );
        let rows: Vec<BotIntegrationRow> = sqlx::query_as(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| database_error("Failed to list bot integrations", e))?;

        rows.into_iter()
            .map(|row| row.into_integration(&self.cipher))
            .collect()
    }

    async fn routing_secret_exists(&self, routing_secret: &str) -> Result<bool, DomainError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM bot_integrations WHERE routing_secret_digest = $1)",
        )
        .bind(self.cipher.digest(routing_secret))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| database_error("Failed to check routing secret", e))?;

        Ok(exists)
    }

    async fn bot_token_in_use(
        &self,
        bot_token: &str,
        excluding: Option<&BotIntegrationId>,
    ) -> Result<bool, DomainError> {
        let in_use: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM bot_integrations
                WHERE bot_token_digest = $1 AND ($2::uuid IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(self.cipher.digest(bot_token))
        .bind(excluding.map(|id| *id.as_uuid()))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| database_error("Failed to check bot token", e))?;

        Ok(in_use)
    }
}
