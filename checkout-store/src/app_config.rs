use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub payments: PaymentsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub orders_file: PathBuf,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Stripe,
    /// In-process fake, for local development without provider credentials.
    Mock,
}

#[derive(Deserialize, Clone)]
pub struct PaymentsConfig {
    pub provider: ProviderKind,
    pub api_base: String,
    #[serde(default)]
    pub secret_key: String,
    pub webhook_secret: Option<String>,
    pub currency: String,
    pub timeout_seconds: u64,
    #[serde(default = "default_tolerance")]
    pub webhook_tolerance_seconds: i64,
}

fn default_tolerance() -> i64 { checkout_core::signature::DEFAULT_TOLERANCE_SECONDS }

impl std::fmt::Debug for PaymentsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentsConfig")
            .field("provider", &self.provider)
            .field("api_base", &self.api_base)
            .field("secret_key", &"********")
            .field("webhook_secret", &self.webhook_secret.as_ref().map(|_| "********"))
            .field("currency", &self.currency)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("webhook_tolerance_seconds", &self.webhook_tolerance_seconds)
            .finish()
    }
}

impl PaymentsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Configured webhook secret; an empty value counts as unset.
    pub fn webhook_secret(&self) -> Option<&str> {
        self.webhook_secret.as_deref().filter(|s| !s.is_empty())
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    pub fn load_from(dir: &str) -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name(&format!("{}/default", dir)))
            // Add in the current environment file
            // Note that this file is _optional_
            .add_source(config::File::with_name(&format!("{}/{}", dir, run_mode)).required(false))
            // Add in a local configuration file
            // This file shouldn't be checked in to git
            .add_source(config::File::with_name(&format!("{}/local", dir)).required(false))
            // Eg.. `CHECKOUT__SERVER__PORT=8080` would set `server.port`
            .add_source(config::Environment::with_prefix("CHECKOUT").separator("__"))
            // Variables the deployment scripts already export
            .set_override_option("server.port", env::var("PORT").ok())?
            .set_override_option("payments.secret_key", env::var("STRIPE_SECRET_KEY").ok())?
            .set_override_option("payments.webhook_secret", env::var("STRIPE_WEBHOOK_SECRET").ok())?
            .build()?;

        s.try_deserialize()
    }
}
