//! Identity-provider assertion verification.
//!
//! A federated login hands us a signed ID token from the provider. Its
//! claims are only trusted after the signature checks out against the
//! provider's published keys and `iss`/`aud`/`exp` match.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::AuthError;
use crate::models::auth::IdentityClaims;

/// Google's published signing keys.
pub const GOOGLE_JWKS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";

/// Issuers Google uses for ID tokens.
pub const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

/// How long a fetched key set is reused before refetching.
const JWKS_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// Minimum age of the cached key set before an unknown `kid` may trigger a
/// refetch. Bounds the outbound requests a stream of bogus key ids can cause.
const JWKS_MIN_REFETCH: Duration = Duration::from_secs(60);

/// Checks an identity assertion and returns its claims.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, assertion: &str) -> Result<IdentityClaims, AuthError>;
}

/// Rejects every assertion. Used when no provider is configured.
#[derive(Debug, Default)]
pub struct DisabledIdentityVerifier;

#[async_trait]
impl IdentityVerifier for DisabledIdentityVerifier {
    async fn verify(&self, _assertion: &str) -> Result<IdentityClaims, AuthError> {
        Err(AuthError::InvalidAssertion(
            "federated login is not configured".into(),
        ))
    }
}

#[derive(Debug)]
struct CachedKeys {
    keys: JwkSet,
    fetched_at: Instant,
}

impl CachedKeys {
    /// Whether `kid` must be answered from this set without refetching:
    /// the set is fresh and either knows the key or was fetched too
    /// recently to ask again.
    fn answers(&self, kid: &str) -> bool {
        let age = self.fetched_at.elapsed();
        age < JWKS_CACHE_TTL && (age < JWKS_MIN_REFETCH || self.keys.find(kid).is_some())
    }
}

#[derive(Debug)]
enum KeySource {
    /// Fetched from a JWKS endpoint and cached.
    Remote {
        url: String,
        http: reqwest::Client,
        cache: RwLock<Option<CachedKeys>>,
    },
    /// Fixed key set supplied at construction.
    Static(JwkSet),
}

/// Verifies Google ID tokens (the `credential` posted by Google Identity
/// Services) against Google's JWKS.
#[derive(Debug)]
pub struct GoogleIdTokenVerifier {
    client_id: String,
    issuers: Vec<String>,
    algorithms: Vec<Algorithm>,
    source: KeySource,
}

impl GoogleIdTokenVerifier {
    /// Verifier that fetches keys from Google.
    pub fn new(client_id: impl Into<String>) -> Self {
        Self::with_jwks_url(client_id, GOOGLE_JWKS_URL)
    }

    /// Verifier that fetches keys from a custom JWKS endpoint.
    pub fn with_jwks_url(client_id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            issuers: GOOGLE_ISSUERS.iter().map(|s| s.to_string()).collect(),
            algorithms: vec![Algorithm::RS256],
            source: KeySource::Remote {
                url: url.into(),
                http: reqwest::Client::new(),
                cache: RwLock::new(None),
            },
        }
    }

    /// Verifier over a fixed key set; never touches the network.
    pub fn with_static_keys(client_id: impl Into<String>, keys: JwkSet) -> Self {
        Self {
            client_id: client_id.into(),
            issuers: GOOGLE_ISSUERS.iter().map(|s| s.to_string()).collect(),
            algorithms: vec![Algorithm::RS256],
            source: KeySource::Static(keys),
        }
    }

    /// Replace the accepted signing algorithms (default: RS256 only).
    pub fn with_algorithms(mut self, algorithms: Vec<Algorithm>) -> Self {
        self.algorithms = algorithms;
        self
    }

    async fn fetch_keys(http: &reqwest::Client, url: &str) -> Result<JwkSet, AuthError> {
        let resp = http
            .get(url)
            .send()
            .await
            .map_err(|e| AuthError::Internal(format!("JWKS fetch failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(AuthError::Internal(format!(
                "JWKS fetch HTTP {}",
                resp.status()
            )));
        }
        resp.json::<JwkSet>()
            .await
            .map_err(|e| AuthError::Internal(format!("JWKS parse error: {e}")))
    }

    /// Find the decoding key for `kid`, refreshing the remote cache when it
    /// is stale or does not know the key yet. An unknown key is refetched
    /// at most once per [`JWKS_MIN_REFETCH`].
    async fn key_for(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        let (url, http, cache) = match &self.source {
            KeySource::Static(keys) => return decoding_key(keys, kid),
            KeySource::Remote { url, http, cache } => (url, http, cache),
        };

        {
            let guard = cache.read().await;
            if let Some(cached) = guard.as_ref()
                && cached.answers(kid)
            {
                return decoding_key(&cached.keys, kid);
            }
        }

        debug!(kid, "refreshing identity provider keys");
        let keys = Self::fetch_keys(http, url).await?;
        let key = decoding_key(&keys, kid);
        *cache.write().await = Some(CachedKeys {
            keys,
            fetched_at: Instant::now(),
        });
        key
    }
}

fn decoding_key(keys: &JwkSet, kid: &str) -> Result<DecodingKey, AuthError> {
    let jwk = keys
        .find(kid)
        .ok_or_else(|| AuthError::InvalidAssertion(format!("unknown signing key {kid}")))?;
    DecodingKey::from_jwk(jwk)
        .map_err(|e| AuthError::InvalidAssertion(format!("unusable signing key: {e}")))
}

#[async_trait]
impl IdentityVerifier for GoogleIdTokenVerifier {
    async fn verify(&self, assertion: &str) -> Result<IdentityClaims, AuthError> {
        let header = decode_header(assertion)
            .map_err(|e| AuthError::InvalidAssertion(format!("malformed assertion: {e}")))?;
        if !self.algorithms.contains(&header.alg) {
            return Err(AuthError::InvalidAssertion(format!(
                "algorithm {:?} not accepted",
                header.alg
            )));
        }
        let kid = header
            .kid
            .ok_or_else(|| AuthError::InvalidAssertion("assertion has no key id".into()))?;
        let key = self.key_for(&kid).await?;

        let mut validation = Validation::new(header.alg);
        validation.set_audience(&[&self.client_id]);
        validation.set_issuer(&self.issuers);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        let claims = decode::<IdentityClaims>(assertion, &key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                warn!("identity assertion rejected: {e}");
                AuthError::InvalidAssertion(e.to_string())
            })?;

        if claims.sub.is_empty() || claims.email.is_empty() {
            return Err(AuthError::InvalidAssertion(
                "assertion lacks subject or email".into(),
            ));
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use chrono::Utc;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::json;

    use super::*;

    const CLIENT_ID: &str = "test-client.apps.googleusercontent.com";
    const PROVIDER_KEY: &[u8] = b"provider-signing-key-for-tests-00001";

    fn key_set() -> JwkSet {
        serde_json::from_value(json!({
            "keys": [{
                "kty": "oct",
                "kid": "k1",
                "alg": "HS256",
                "k": URL_SAFE_NO_PAD.encode(PROVIDER_KEY),
            }]
        }))
        .unwrap()
    }

    fn verifier() -> GoogleIdTokenVerifier {
        GoogleIdTokenVerifier::with_static_keys(CLIENT_ID, key_set())
            .with_algorithms(vec![Algorithm::HS256])
    }

    fn assertion(claims: serde_json::Value, kid: &str, key: &[u8]) -> String {
        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some(kid.to_string());
        encode(&header, &claims, &EncodingKey::from_secret(key)).unwrap()
    }

    fn good_claims() -> serde_json::Value {
        json!({
            "iss": "https://accounts.google.com",
            "aud": CLIENT_ID,
            "sub": "1234567890",
            "email": "fed@example.com",
            "email_verified": true,
            "exp": Utc::now().timestamp() + 600,
            "iat": Utc::now().timestamp(),
        })
    }

    #[tokio::test]
    async fn valid_assertion_yields_claims() {
        let token = assertion(good_claims(), "k1", PROVIDER_KEY);
        let claims = verifier().verify(&token).await.unwrap();
        assert_eq!(claims.sub, "1234567890");
        assert_eq!(claims.email, "fed@example.com");
        assert_eq!(claims.email_verified, Some(true));
    }

    #[tokio::test]
    async fn forged_signature_is_rejected() {
        let token = assertion(good_claims(), "k1", b"attacker-key");
        assert!(matches!(
            verifier().verify(&token).await,
            Err(AuthError::InvalidAssertion(_))
        ));
    }

    #[tokio::test]
    async fn wrong_audience_is_rejected() {
        let mut claims = good_claims();
        claims["aud"] = json!("someone-else");
        let token = assertion(claims, "k1", PROVIDER_KEY);
        assert!(verifier().verify(&token).await.is_err());
    }

    #[tokio::test]
    async fn wrong_issuer_is_rejected() {
        let mut claims = good_claims();
        claims["iss"] = json!("https://evil.example.com");
        let token = assertion(claims, "k1", PROVIDER_KEY);
        assert!(verifier().verify(&token).await.is_err());
    }

    #[tokio::test]
    async fn expired_assertion_is_rejected() {
        let mut claims = good_claims();
        claims["exp"] = json!(Utc::now().timestamp() - 3600);
        let token = assertion(claims, "k1", PROVIDER_KEY);
        assert!(verifier().verify(&token).await.is_err());
    }

    #[tokio::test]
    async fn unknown_kid_is_rejected() {
        let token = assertion(good_claims(), "k2", PROVIDER_KEY);
        assert!(verifier().verify(&token).await.is_err());
    }

    /// Remote verifier whose endpoint refuses connections, with `key_set()`
    /// cached as if fetched `age` ago. Any refetch surfaces as `Internal`.
    async fn remote_verifier_cached(age: Duration) -> GoogleIdTokenVerifier {
        let verifier = GoogleIdTokenVerifier::with_jwks_url(CLIENT_ID, "http://127.0.0.1:9/certs")
            .with_algorithms(vec![Algorithm::HS256]);
        let KeySource::Remote { cache, .. } = &verifier.source else {
            unreachable!("with_jwks_url builds a remote source");
        };
        *cache.write().await = Some(CachedKeys {
            keys: key_set(),
            fetched_at: Instant::now().checked_sub(age).unwrap(),
        });
        verifier
    }

    #[tokio::test]
    async fn recently_fetched_keys_are_not_refetched_for_unknown_kid() {
        let verifier = remote_verifier_cached(Duration::from_secs(5)).await;

        let known = assertion(good_claims(), "k1", PROVIDER_KEY);
        assert!(verifier.verify(&known).await.is_ok());

        let unknown = assertion(good_claims(), "k2", PROVIDER_KEY);
        for _ in 0..3 {
            let err = verifier.verify(&unknown).await.unwrap_err();
            assert!(
                matches!(&err, AuthError::InvalidAssertion(m) if m.contains("unknown signing key")),
                "{err:?}"
            );
        }
    }

    #[tokio::test]
    async fn unknown_kid_refetches_once_interval_has_passed() {
        let verifier = remote_verifier_cached(JWKS_MIN_REFETCH + Duration::from_secs(1)).await;

        let known = assertion(good_claims(), "k1", PROVIDER_KEY);
        assert!(verifier.verify(&known).await.is_ok());

        let unknown = assertion(good_claims(), "k2", PROVIDER_KEY);
        assert!(matches!(
            verifier.verify(&unknown).await,
            Err(AuthError::Internal(_))
        ));
    }

    #[tokio::test]
    async fn disallowed_algorithm_is_rejected() {
        // Default verifier only accepts RS256.
        let strict = GoogleIdTokenVerifier::with_static_keys(CLIENT_ID, key_set());
        let token = assertion(good_claims(), "k1", PROVIDER_KEY);
        assert!(strict.verify(&token).await.is_err());
    }

    #[tokio::test]
    async fn garbage_is_rejected() {
        assert!(verifier().verify("not-a-jwt").await.is_err());
        assert!(DisabledIdentityVerifier.verify("anything").await.is_err());
    }
}
