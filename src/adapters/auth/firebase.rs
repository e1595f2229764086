//! Firebase identity adapter.
//!
//! Implements `SessionValidator` and `AuthProvider` for Firebase ID tokens:
//!
//! 1. Fetches Google's securetoken JWKS lazily and caches it for a TTL
//! 2. Verifies the RS256 signature against the key named by `kid`
//! 3. Requires `iss = https://securetoken.google.com/<project>`, `aud = <project>`,
//!    a live `exp` and a non-empty `sub`
//!
//! Profile lookups go to the Identity Toolkit `accounts:lookup` endpoint when
//! an admin access token is configured. Without one, the adapter answers from
//! profiles seen in recently validated tokens.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, jwk::JwkSet, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::config::AuthConfig;
use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};
use crate::ports::{AuthProvider, SessionValidator};

/// Profiles kept from validated tokens before the cache is reset.
const MAX_CACHED_PROFILES: usize = 10_000;

/// Configuration for the Firebase adapter.
#[derive(Clone)]
pub struct FirebaseConfig {
    pub project_id: String,
    pub jwks_url: String,
    pub jwks_cache_duration: Duration,
    pub identity_toolkit_url: String,
    pub admin_access_token: Option<SecretString>,
    pub http_timeout: Duration,
}

impl FirebaseConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self::from(&AuthConfig {
            firebase_project_id: project_id.into(),
            ..AuthConfig::default()
        })
    }

    fn issuer(&self) -> String {
        format!("https://securetoken.google.com/{}", self.project_id)
    }

    fn lookup_url(&self) -> String {
        format!(
            "{}/projects/{}/accounts:lookup",
            self.identity_toolkit_url.trim_end_matches('/'),
            self.project_id
        )
    }
}

impl From<&AuthConfig> for FirebaseConfig {
    fn from(config: &AuthConfig) -> Self {
        Self {
            project_id: config.firebase_project_id.clone(),
            jwks_url: config.jwks_url.clone(),
            jwks_cache_duration: config.jwks_cache_ttl(),
            identity_toolkit_url: config.identity_toolkit_url.clone(),
            admin_access_token: config.admin_access_token.clone(),
            http_timeout: config.http_timeout(),
        }
    }
}

/// Claims carried by a Firebase ID token.
#[derive(Debug, Serialize, Deserialize)]
struct FirebaseClaims {
    sub: String,
    iss: String,
    aud: String,
    exp: i64,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_verified: Option<bool>,
    #[serde(default)]
    name: Option<String>,
}

impl FirebaseClaims {
    fn into_user(self) -> Result<AuthenticatedUser, AuthError> {
        let user_id = UserId::new(self.sub).map_err(|_| {
            tracing::warn!("Token has empty subject");
            AuthError::InvalidToken
        })?;

        Ok(AuthenticatedUser::new(
            user_id,
            self.email.unwrap_or_default(),
            self.name,
            self.email_verified.unwrap_or(false),
        ))
    }
}

/// Body of an `accounts:lookup` response.
#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    email_verified: bool,
}

fn user_from_lookup(response: LookupResponse, user_id: &UserId) -> Result<AuthenticatedUser, AuthError> {
    let found = response
        .users
        .into_iter()
        .find(|u| u.local_id == user_id.as_str())
        .ok_or(AuthError::UserNotFound)?;

    Ok(AuthenticatedUser::new(
        user_id.clone(),
        found.email.unwrap_or_default(),
        found.display_name,
        found.email_verified,
    ))
}

/// Cached JWKS with expiry tracking.
struct JwksCache {
    jwks: JwkSet,
    fetched_at: Instant,
    cache_duration: Duration,
}

impl JwksCache {
    fn new(jwks: JwkSet, cache_duration: Duration) -> Self {
        Self {
            jwks,
            fetched_at: Instant::now(),
            cache_duration,
        }
    }

    fn is_expired(&self) -> bool {
        self.fetched_at.elapsed() > self.cache_duration
    }
}

/// Firebase ID-token validator and profile source.
pub struct FirebaseIdentity {
    config: FirebaseConfig,
    http_client: reqwest::Client,
    jwks_cache: Arc<RwLock<Option<JwksCache>>>,
    profiles: Arc<RwLock<HashMap<UserId, AuthenticatedUser>>>,
}

impl FirebaseIdentity {
    /// Keys are fetched on first validation, not here.
    pub fn new(config: FirebaseConfig) -> Result<Self, AuthError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| AuthError::service_unavailable(format!("HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
            jwks_cache: Arc::new(RwLock::new(None)),
            profiles: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    async fn fetch_jwks(&self) -> Result<JwkSet, AuthError> {
        tracing::debug!(url = %self.config.jwks_url, "Fetching JWKS");

        let response = self
            .http_client
            .get(&self.config.jwks_url)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to fetch JWKS");
                AuthError::service_unavailable(format!("Failed to fetch JWKS: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::error!(status = status.as_u16(), "JWKS endpoint returned error");
            return Err(AuthError::service_unavailable(format!("JWKS endpoint returned {}", status)));
        }

        let jwks: JwkSet = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to parse JWKS");
            AuthError::service_unavailable(format!("Failed to parse JWKS: {}", e))
        })?;

        tracing::debug!(keys = jwks.keys.len(), "Fetched JWKS");
        Ok(jwks)
    }

    async fn get_jwks(&self) -> Result<JwkSet, AuthError> {
        {
            let cache = self.jwks_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if !cached.is_expired() {
                    return Ok(cached.jwks.clone());
                }
            }
        }

        let jwks = self.fetch_jwks().await?;
        *self.jwks_cache.write().await = Some(JwksCache::new(jwks.clone(), self.config.jwks_cache_duration));
        Ok(jwks)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[self.config.issuer()]);
        validation.set_audience(&[&self.config.project_id]);
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation
    }

    fn decode_claims(&self, token: &str, key: &DecodingKey) -> Result<FirebaseClaims, AuthError> {
        decode::<FirebaseClaims>(token, key, &self.validation())
            .map(|data| data.claims)
            .map_err(|e| {
                use jsonwebtoken::errors::ErrorKind;
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    _ => {
                        tracing::warn!(error = %e, "Token validation failed");
                        AuthError::InvalidToken
                    }
                }
            })
    }

    async fn remember(&self, user: &AuthenticatedUser) {
        let mut profiles = self.profiles.write().await;
        if profiles.len() >= MAX_CACHED_PROFILES && !profiles.contains_key(&user.id) {
            profiles.clear();
        }
        profiles.insert(user.id.clone(), user.clone());
    }

    async fn lookup(&self, user_id: &UserId, admin_token: &SecretString) -> Result<AuthenticatedUser, AuthError> {
        let response = self
            .http_client
            .post(self.config.lookup_url())
            .bearer_auth(admin_token.expose_secret())
            .json(&serde_json::json!({ "localId": [user_id.as_str()] }))
            .send()
            .await
            .map_err(|e| AuthError::service_unavailable(format!("Profile lookup failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::warn!(user_id = %user_id, status = status.as_u16(), "Profile lookup rejected");
            return Err(AuthError::service_unavailable(format!("Profile lookup returned {}", status)));
        }

        let body: LookupResponse = response
            .json()
            .await
            .map_err(|e| AuthError::service_unavailable(format!("Invalid lookup response: {}", e)))?;

        user_from_lookup(body, user_id)
    }
}

#[async_trait]
impl SessionValidator for FirebaseIdentity {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let header = decode_header(token).map_err(|e| {
            tracing::debug!(error = %e, "Failed to decode token header");
            AuthError::InvalidToken
        })?;

        if header.alg != Algorithm::RS256 {
            tracing::warn!(alg = ?header.alg, "Unexpected token algorithm");
            return Err(AuthError::InvalidToken);
        }

        let kid = header.kid.ok_or(AuthError::InvalidToken)?;
        let jwks = self.get_jwks().await?;
        let jwk = jwks.find(&kid).ok_or_else(|| {
            tracing::warn!(kid = %kid, "No matching signing key");
            AuthError::InvalidToken
        })?;
        let key = DecodingKey::from_jwk(jwk).map_err(|_| AuthError::InvalidToken)?;

        let user = self.decode_claims(token, &key)?.into_user()?;
        self.remember(&user).await;
        Ok(user)
    }
}

#[async_trait]
impl AuthProvider for FirebaseIdentity {
    async fn get_user(&self, user_id: &UserId) -> Result<AuthenticatedUser, AuthError> {
        if let Some(admin_token) = self.config.admin_access_token.as_ref() {
            return self.lookup(user_id, admin_token).await;
        }

        self.profiles
            .read()
            .await
            .get(user_id)
            .cloned()
            .ok_or(AuthError::UserNotFound)
    }
}

impl std::fmt::Debug for FirebaseIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseIdentity")
            .field("project_id", &self.config.project_id)
            .field("admin_lookup", &self.config.admin_access_token.is_some())
            .finish_non_exhaustive()
    }
}
