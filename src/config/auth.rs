//! Authentication configuration

use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;

/// Authentication configuration (Firebase ID tokens)
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Firebase project; tokens must name it as audience
    pub firebase_project_id: String,

    /// Signing keys for ID tokens
    #[serde(default = "default_jwks_url")]
    pub jwks_url: String,

    /// JWKS cache TTL in seconds
    #[serde(default = "default_jwks_cache_ttl")]
    pub jwks_cache_ttl_secs: u64,

    /// OAuth access token for admin profile lookups
    pub admin_access_token: Option<SecretString>,

    /// Identity Toolkit base URL
    #[serde(default = "default_identity_toolkit_url")]
    pub identity_toolkit_url: String,

    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
}

impl AuthConfig {
    /// Get JWKS cache TTL as Duration
    pub fn jwks_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.jwks_cache_ttl_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Issuer every valid token carries.
    pub fn issuer(&self) -> String {
        format!("https://securetoken.google.com/{}", self.firebase_project_id)
    }

    /// Validate authentication configuration
    ///
    /// In production, the key and lookup endpoints must be HTTPS.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.firebase_project_id.trim().is_empty() {
            return Err(ValidationError::MissingRequired("FIREBASE_PROJECT_ID"));
        }
        if self.jwks_url.is_empty() {
            return Err(ValidationError::MissingRequired("JWKS_URL"));
        }

        if *environment == Environment::Production {
            if !self.jwks_url.starts_with("https://") {
                return Err(ValidationError::MustBeHttps("JWKS_URL"));
            }
            if !self.identity_toolkit_url.starts_with("https://") {
                return Err(ValidationError::MustBeHttps("IDENTITY_TOOLKIT_URL"));
            }
        }

        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            firebase_project_id: String::new(),
            jwks_url: default_jwks_url(),
            jwks_cache_ttl_secs: default_jwks_cache_ttl(),
            admin_access_token: None,
            identity_toolkit_url: default_identity_toolkit_url(),
            http_timeout_secs: default_http_timeout(),
        }
    }
}

fn default_jwks_url() -> String {
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com"
        .to_string()
}

fn default_jwks_cache_ttl() -> u64 {
    3600
}

fn default_identity_toolkit_url() -> String {
    "https://identitytoolkit.googleapis.com/v1".to_string()
}

fn default_http_timeout() -> u64 {
    10
}
