//! Webhook signature verification.
//!
//! The provider signs every delivery with `hex(HMAC-SHA256(secret, body))`
//! and sends the digest in a request header. Verification must run over the
//! exact bytes received; re-serializing parsed JSON changes the digest.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// How strictly the service treats a missing webhook secret.
///
/// `Permissive` accepts unsigned webhooks when no secret is configured. It
/// exists for local development only and is refused in production by config
/// validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    #[default]
    Strict,
    Permissive,
}

impl DeploymentMode {
    pub fn is_permissive(&self) -> bool {
        matches!(self, DeploymentMode::Permissive)
    }
}

/// Verifies webhook signatures against the configured shared secret.
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: Option<SecretString>,
    mode: DeploymentMode,
}

impl SignatureVerifier {
    /// An empty secret counts as no secret.
    pub fn new(secret: Option<SecretString>, mode: DeploymentMode) -> Self {
        let secret = secret.filter(|s| !s.expose_secret().is_empty());
        Self { secret, mode }
    }

    pub fn mode(&self) -> DeploymentMode {
        self.mode
    }

    pub fn has_secret(&self) -> bool {
        self.secret.is_some()
    }

    /// Checks `provided_signature` against the digest of `raw_body`.
    pub fn verify(&self, raw_body: &[u8], provided_signature: &str) -> bool {
        verify_signature(
            raw_body,
            provided_signature,
            self.secret.as_ref().map(|s| s.expose_secret().as_str()),
            self.mode,
        )
    }
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("has_secret", &self.secret.is_some())
            .field("mode", &self.mode)
            .finish()
    }
}

/// Stateless form of [`SignatureVerifier::verify`].
///
/// Without a secret the answer depends only on `mode`. With a secret, an
/// empty signature always fails and anything else is compared in constant
/// time against the lowercase hex digest.
pub fn verify_signature(
    raw_body: &[u8],
    provided_signature: &str,
    secret: Option<&str>,
    mode: DeploymentMode,
) -> bool {
    let secret = match secret {
        Some(secret) if !secret.is_empty() => secret,
        _ => return mode.is_permissive(),
    };

    if provided_signature.is_empty() {
        return false;
    }

    let Some(expected) = compute_signature(secret, raw_body) else {
        return false;
    };

    constant_time_compare(expected.as_bytes(), provided_signature.as_bytes())
}

/// Lowercase hex HMAC-SHA256 of `payload` keyed by `secret`.
pub fn compute_signature(secret: &str, payload: &[u8]) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(payload);
    Some(hex::encode(mac.finalize().into_bytes()))
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SECRET: &str = "lsz_webhook_secret";

    fn sign(payload: &[u8]) -> String {
        compute_signature(SECRET, payload).unwrap()
    }

    // ══════════════════════════════════════════════════════════════
    // Missing Secret
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn missing_secret_in_strict_mode_rejects() {
        assert!(!verify_signature(b"{}", "anything", None, DeploymentMode::Strict));
    }

    #[test]
    fn missing_secret_in_permissive_mode_accepts() {
        assert!(verify_signature(b"{}", "", None, DeploymentMode::Permissive));
    }

    #[test]
    fn empty_secret_is_treated_as_missing() {
        assert!(!verify_signature(b"{}", "sig", Some(""), DeploymentMode::Strict));
        let verifier = SignatureVerifier::new(Some(SecretString::new(String::new())), DeploymentMode::Strict);
        assert!(!verifier.has_secret());
    }

    // ══════════════════════════════════════════════════════════════
    // Configured Secret
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn valid_signature_verifies() {
        let body = br#"{"meta":{"event_name":"subscription_created"}}"#;
        assert!(verify_signature(body, &sign(body), Some(SECRET), DeploymentMode::Strict));
    }

    #[test]
    fn empty_signature_fails_even_when_permissive() {
        assert!(!verify_signature(b"{}", "", Some(SECRET), DeploymentMode::Permissive));
    }

    #[test]
    fn wrong_secret_fails() {
        let body = b"payload";
        let sig = compute_signature("other", body).unwrap();
        assert!(!verify_signature(body, &sig, Some(SECRET), DeploymentMode::Strict));
    }

    #[test]
    fn uppercase_hex_is_not_accepted() {
        let body = b"payload";
        let sig = sign(body).to_uppercase();
        assert!(!verify_signature(body, &sig, Some(SECRET), DeploymentMode::Strict));
    }

    #[test]
    fn reserialized_json_does_not_verify() {
        let raw = br#"{ "b": 1,  "a": 2 }"#;
        let sig = sign(raw);
        let value: serde_json::Value = serde_json::from_slice(raw).unwrap();
        let reserialized = serde_json::to_vec(&value).unwrap();

        assert!(!verify_signature(&reserialized, &sig, Some(SECRET), DeploymentMode::Strict));
    }

    #[test]
    fn verifier_struct_uses_configured_secret() {
        let verifier = SignatureVerifier::new(Some(SecretString::new(SECRET.to_string())), DeploymentMode::Strict);
        let body = b"hello";
        assert!(verifier.verify(body, &sign(body)));
        assert!(!verifier.verify(body, "deadbeef"));
    }

    #[test]
    fn debug_output_hides_secret() {
        let verifier = SignatureVerifier::new(Some(SecretString::new(SECRET.to_string())), DeploymentMode::Strict);
        let debug = format!("{:?}", verifier);
        assert!(!debug.contains(SECRET));
        assert!(debug.contains("has_secret: true"));
    }

    #[test]
    fn constant_time_compare_different_lengths() {
        assert!(!constant_time_compare(b"abc", b"abcd"));
    }

    #[test]
    fn deployment_mode_deserializes_lowercase() {
        let mode: DeploymentMode = serde_json::from_str("\"permissive\"").unwrap();
        assert_eq!(mode, DeploymentMode::Permissive);
        assert_eq!(DeploymentMode::default(), DeploymentMode::Strict);
    }

    // ══════════════════════════════════════════════════════════════
    // Properties
    // ══════════════════════════════════════════════════════════════

    proptest! {
        #[test]
        fn own_signature_always_verifies(payload in proptest::collection::vec(any::<u8>(), 0..512), secret in "[a-zA-Z0-9]{1,40}") {
            let sig = compute_signature(&secret, &payload).unwrap();
            prop_assert!(verify_signature(&payload, &sig, Some(&secret), DeploymentMode::Strict));
        }

        #[test]
        fn flipping_a_payload_bit_fails(payload in proptest::collection::vec(any::<u8>(), 1..256), index in any::<prop::sample::Index>(), bit in 0u8..8) {
            let sig = sign(&payload);
            let mut mutated = payload.clone();
            let i = index.index(mutated.len());
            mutated[i] ^= 1 << bit;
            prop_assert!(!verify_signature(&mutated, &sig, Some(SECRET), DeploymentMode::Strict));
        }

        #[test]
        fn flipping_a_signature_bit_fails(payload in proptest::collection::vec(any::<u8>(), 0..256), index in any::<prop::sample::Index>(), bit in 0u8..8) {
            let mut sig = sign(&payload).into_bytes();
            let i = index.index(sig.len());
            sig[i] ^= 1 << bit;
            let mutated = String::from_utf8_lossy(&sig).into_owned();
            prop_assert!(!verify_signature(&payload, &mutated, Some(SECRET), DeploymentMode::Strict));
        }
    }
}
