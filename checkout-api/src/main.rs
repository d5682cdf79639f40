use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use checkout_api::{app, state::AppState};
use checkout_core::payment::PaymentClient;
use checkout_core::signature::WebhookVerifier;
use checkout_order::{CheckoutSettings, MockPaymentClient, OrderStore};
use checkout_store::app_config::{Config, ProviderKind};
use checkout_store::{JsonFileOrderStore, StripeClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "checkout_api=debug,checkout_order=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting checkout API on port {}", config.server.port);

    let store: Arc<dyn OrderStore> = Arc::new(JsonFileOrderStore::new(&config.store.orders_file));
    tracing::info!("Orders persisted to {}", config.store.orders_file.display());

    let payments: Arc<dyn PaymentClient> = match config.payments.provider {
        ProviderKind::Stripe => {
            if config.payments.secret_key.is_empty() {
                tracing::warn!("No Stripe secret key configured; checkout requests will fail and clients fall back to demo orders");
            }
            Arc::new(
                StripeClient::new(
                    &config.payments.api_base,
                    &config.payments.secret_key,
                    config.payments.timeout(),
                )
                .context("Failed to build Stripe client")?,
            )
        }
        ProviderKind::Mock => {
            tracing::warn!("Using in-process mock payment provider; no real payments are taken");
            Arc::new(MockPaymentClient::session_scoped())
        }
    };

    let verifier = match config.payments.webhook_secret() {
        Some(secret) => Some(WebhookVerifier::new(secret, config.payments.webhook_tolerance_seconds)),
        None => {
            tracing::warn!("No webhook secret configured; webhook events are trusted without signature verification");
            None
        }
    };

    let settings = CheckoutSettings {
        currency: config.payments.currency.clone(),
        provider_timeout: config.payments.timeout(),
    };
    let app_state = AppState::new(payments, store, settings, verifier);

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
