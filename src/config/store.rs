//! Subscription store configuration
//!
//! Exactly one backend is active. Its section must be present; the other
//! sections are ignored.

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local map; records vanish on restart.
    #[default]
    Memory,
    Redis,
    Postgres,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Memory => "memory",
            StoreBackend::Redis => "redis",
            StoreBackend::Postgres => "postgres",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    pub redis: Option<RedisConfig>,

    pub database: Option<DatabaseConfig>,
}

impl StoreConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.backend {
            StoreBackend::Memory => Ok(()),
            StoreBackend::Redis => self
                .redis
                .as_ref()
                .ok_or(ValidationError::MissingStoreSection("redis"))?
                .validate(),
            StoreBackend::Postgres => self
                .database
                .as_ref()
                .ok_or(ValidationError::MissingStoreSection("postgres"))?
                .validate(),
        }
    }
}

/// Redis key-value backend
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,

    /// Records live at `<key_prefix>:<user_id>`
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Per-command timeout in seconds
    #[serde(default = "default_redis_timeout")]
    pub timeout_secs: u64,
}

impl RedisConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::MissingRequired("STORE_REDIS_URL"));
        }
        if !self.url.starts_with("redis://") && !self.url.starts_with("rediss://") {
            return Err(ValidationError::InvalidRedisUrl);
        }
        if self.key_prefix.trim().is_empty() {
            return Err(ValidationError::MissingRequired("STORE_REDIS_KEY_PREFIX"));
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            key_prefix: default_key_prefix(),
            timeout_secs: default_redis_timeout(),
        }
    }
}

/// PostgreSQL backend
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    /// Apply pending migrations at startup
    #[serde(default)]
    pub run_migrations: bool,
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::MissingRequired("STORE_DATABASE_URL"));
        }
        if !self.url.starts_with("postgres://") && !self.url.starts_with("postgresql://") {
            return Err(ValidationError::InvalidDatabaseUrl);
        }
        if self.min_connections > self.max_connections {
            return Err(ValidationError::InvalidPoolSize);
        }
        if self.max_connections > 100 {
            return Err(ValidationError::PoolSizeTooLarge);
        }
        Ok(())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            acquire_timeout_secs: default_acquire_timeout(),
            run_migrations: false,
        }
    }
}

fn default_key_prefix() -> String {
    "subscription".to_string()
}

fn default_redis_timeout() -> u64 {
    5
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_acquire_timeout() -> u64 {
    30
}
