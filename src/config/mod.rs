//! Application configuration module
//!
//! Type-safe configuration loading using the `config` and `dotenvy` crates.
//! Sources, lowest precedence first:
//!
//! 1. `.env` file, if present
//! 2. a config file named by `SUBSCRIPTION_SYNC_CONFIG` (any format `config` reads)
//! 3. environment variables with the `SUBSCRIPTION_SYNC` prefix, `__` between levels
//!
//! # Example
//!
//! ```no_run
//! use subscription_sync::config::AppConfig;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = AppConfig::load()?;
//! config.validate()?;
//!
//! println!("Server running on {:?}", config.server.socket_addr());
//! # Ok(())
//! # }
//! ```

mod auth;
mod error;
mod payment;
mod server;
mod store;

pub use auth::AuthConfig;
pub use error::{ConfigError, ValidationError};
pub use payment::PaymentConfig;
pub use server::{Environment, ServerConfig, DEFAULT_CORS_ORIGINS};
pub use store::{DatabaseConfig, RedisConfig, StoreBackend, StoreConfig};

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable holding an optional config file path.
pub const CONFIG_FILE_ENV: &str = "SUBSCRIPTION_SYNC_CONFIG";

const ENV_PREFIX: &str = "SUBSCRIPTION_SYNC";

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (bind address, environment, deployment mode)
    #[serde(default)]
    pub server: ServerConfig,

    /// Firebase identity configuration
    pub auth: AuthConfig,

    /// LemonSqueezy configuration
    pub payment: PaymentConfig,

    /// Subscription store backend
    #[serde(default)]
    pub store: StoreConfig,
}

impl AppConfig {
    /// Load configuration from the file named by `SUBSCRIPTION_SYNC_CONFIG`
    /// (if set) and environment variables.
    ///
    /// # Environment Variable Format
    ///
    /// - `SUBSCRIPTION_SYNC__SERVER__PORT=8081` -> `server.port = 8081`
    /// - `SUBSCRIPTION_SYNC__STORE__REDIS__URL=...` -> `store.redis.url = ...`
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let file = std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from);
        Self::load_from(file.as_deref())
    }

    /// Load from an explicit config file plus environment overrides.
    pub fn load_from(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path));
        }

        let config = builder
            .add_source(config::Environment::default().prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.auth.validate(&self.server.environment)?;
        self.payment.validate()?;
        self.store.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
