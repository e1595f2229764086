//! Subscription Sync service entry point.
//!
//! Owns the lifecycle of every client: configuration is loaded first, then
//! the store, identity, and checkout adapters are built and handed to the
//! router. Nothing is initialised lazily at module level.

use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use subscription_sync::adapters::auth::{FirebaseConfig, FirebaseIdentity};
use subscription_sync::adapters::http::{build_router, AppState};
use subscription_sync::adapters::lemonsqueezy::{LemonSqueezyCheckoutAdapter, LemonSqueezyConfig};
use subscription_sync::adapters::store::{
    InMemorySubscriptionStore, PostgresSubscriptionStore, RedisSubscriptionStore,
};
use subscription_sync::application::UserLocks;
use subscription_sync::config::{AppConfig, ServerConfig, StoreBackend, StoreConfig};
use subscription_sync::domain::subscription::SignatureVerifier;
use subscription_sync::ports::SubscriptionStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config.server)?;
    config.validate().context("invalid configuration")?;

    tracing::info!(
        environment = ?config.server.environment,
        deployment_mode = ?config.server.deployment_mode,
        store = config.store.backend.as_str(),
        "Starting subscription sync"
    );

    let store = build_store(&config.store).await?;

    let identity = Arc::new(FirebaseIdentity::new(FirebaseConfig::from(&config.auth))?);
    let checkout = LemonSqueezyCheckoutAdapter::new(LemonSqueezyConfig::from(&config.payment))?;

    if !config.payment.has_webhook_secret() {
        tracing::warn!(
            deployment_mode = ?config.server.deployment_mode,
            "No webhook secret configured; strict mode rejects every webhook, permissive mode accepts unsigned ones"
        );
    }
    let verifier = SignatureVerifier::new(config.payment.webhook_secret.clone(), config.server.deployment_mode);

    let state = AppState {
        store,
        session_validator: identity.clone(),
        auth_provider: identity,
        checkout_provider: Arc::new(checkout),
        verifier,
        locks: Arc::new(UserLocks::new()),
    };

    let app = build_router(state, &config.server);
    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!(%addr, "HTTP server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// JSON logs in production, human-readable otherwise. `RUST_LOG` wins over
/// the configured level.
fn init_tracing(server: &ServerConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&server.log_level))?;
    let registry = tracing_subscriber::registry().with(filter);

    if server.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()?;
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()?;
    }
    Ok(())
}

async fn build_store(config: &StoreConfig) -> anyhow::Result<Arc<dyn SubscriptionStore>> {
    let store: Arc<dyn SubscriptionStore> = match config.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory subscription store; records are lost on restart");
            Arc::new(InMemorySubscriptionStore::new())
        }
        StoreBackend::Redis => {
            let redis = config.redis.as_ref().context("store.redis section missing")?;
            Arc::new(RedisSubscriptionStore::connect(&redis.url, redis.key_prefix.clone(), redis.timeout()).await?)
        }
        StoreBackend::Postgres => {
            let database = config.database.as_ref().context("store.database section missing")?;
            Arc::new(PostgresSubscriptionStore::connect(database).await?)
        }
    };
    tracing::info!(backend = config.backend.as_str(), "Subscription store ready");
    Ok(store)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
