//! Channel Gate server.
//!
//! ## Endpoints
//!
//! - `POST /telegram/bots/webhooks` - Telegram updates for every tenant bot
//! - `POST /stripe/bots/webhooks` - Stripe events
//! - `GET /health` - Liveness probe

use std::sync::Arc;

use secrecy::SecretString;
use tokio::signal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use channel_gate::adapters::crypto::SecretCipher;
use channel_gate::adapters::http::{router, AppState};
use channel_gate::adapters::i18n::BuiltinMessageCatalog;
use channel_gate::adapters::postgres::{self, PostgresBotIntegrationRepository};
use channel_gate::adapters::redis::{self as redis_adapter, RedisConversationStateStore, RedisProcessedEventStore};
use channel_gate::adapters::scheduler::{RetryPolicy, TokioRegistrationScheduler};
use channel_gate::adapters::stripe::{StripeConfig, StripePaymentAdapter};
use channel_gate::adapters::telegram::TelegramBotApiFactory;
use channel_gate::application::handlers::access::ChannelAccessGranter;
use channel_gate::application::handlers::conversation::ConversationRouter;
use channel_gate::application::handlers::integration::{BotIntegrationRegistry, RegisterBotHandler};
use channel_gate::application::handlers::webhook::PaymentWebhookProcessor;
use channel_gate::config::AppConfig;
use channel_gate::domain::billing::StripeWebhookVerifier;
use channel_gate::ports::{
    BotApiFactory, BotIntegrationRepository, MessageCatalog, PaymentProvider,
    RegistrationScheduler,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = AppConfig::load()?;
    config.validate()?;

    // Initialize logging
    init_tracing(&config);
    tracing::info!(
        environment = ?config.server.environment,
        stripe_live_mode = config.payment.is_live_mode(),
        "Starting Channel Gate"
    );

    // Stores
    let pool = postgres::connect(&config.database).await?;
    let cipher = SecretCipher::new(config.database.encryption_key_bytes()?);
    let repository: Arc<dyn BotIntegrationRepository> =
        Arc::new(PostgresBotIntegrationRepository::new(pool, cipher));
    tracing::info!("Database pool created");

    let redis = redis_adapter::connect(&config.redis).await?;
    let markers = Arc::new(RedisProcessedEventStore::new(redis.clone()));
    let conversation_state = Arc::new(RedisConversationStateStore::new(redis));
    tracing::info!("Redis connected");

    // External systems
    let payments: Arc<dyn PaymentProvider> = Arc::new(StripePaymentAdapter::new(
        StripeConfig::from(&config.payment),
    ));
    let bots: Arc<dyn BotApiFactory> = Arc::new(TelegramBotApiFactory::new(&config.telegram));
    let catalog: Arc<dyn MessageCatalog> = Arc::new(BuiltinMessageCatalog::new());

    // Background registration
    let register_bot = Arc::new(RegisterBotHandler::new(
        repository.clone(),
        bots.clone(),
        catalog.clone(),
        config.server.telegram_webhook_url(),
    ));
    let scheduler = TokioRegistrationScheduler::new(
        register_bot,
        RetryPolicy::from_config(&config.telegram),
    );
    register_active_bots(repository.as_ref(), &scheduler).await;

    // Application
    let registry = BotIntegrationRegistry::new(repository);
    let verifier = StripeWebhookVerifier::new(SecretString::new(
        config.payment.stripe_webhook_secret.clone(),
    ))
    .require_livemode(config.payment.require_livemode);

    let state = AppState {
        registry: registry.clone(),
        conversations: Arc::new(ConversationRouter::new(
            bots.clone(),
            payments.clone(),
            catalog.clone(),
            conversation_state,
        )),
        payment_webhooks: Arc::new(PaymentWebhookProcessor::new(
            verifier,
            payments,
            registry,
            ChannelAccessGranter::new(bots, catalog),
            markers,
        )
        .with_claim_lease(config.redis.claim_lease())),
    };

    let app = router(state, config.server.request_timeout());
    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if config.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Re-registers every active bot so a changed public URL reaches Telegram.
async fn register_active_bots(
    repository: &dyn BotIntegrationRepository,
    scheduler: &dyn RegistrationScheduler,
) {
    let integrations = match repository.list_active().await {
        Ok(integrations) => integrations,
        Err(e) => {
            tracing::error!(error = %e, "Could not list bot integrations for registration");
            return;
        }
    };

    tracing::info!(count = integrations.len(), "Scheduling bot registration");
    for integration in integrations {
        if let Err(e) = scheduler.schedule(integration.id).await {
            tracing::warn!(integration_id = %integration.id, error = %e, "Could not schedule registration");
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
