//! Bearer-token verifiers.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, decode_header};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use decor_types::{IdentityError, IdentityVerifier, VerifiedIdentity};

/// Google's published signing keys for Firebase ID tokens.
pub const FIREBASE_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

const KEY_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    exp: u64,
}

fn map_jwt_error(e: jsonwebtoken::errors::Error) -> IdentityError {
    match e.kind() {
        ErrorKind::ExpiredSignature => IdentityError::Expired,
        _ => IdentityError::InvalidToken(e.to_string()),
    }
}

fn into_identity(claims: Claims) -> Result<VerifiedIdentity, IdentityError> {
    let email = claims
        .email
        .filter(|e| !e.is_empty())
        .ok_or(IdentityError::MissingEmail)?;
    Ok(VerifiedIdentity {
        email,
        subject: claims.sub,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Firebase
// ─────────────────────────────────────────────────────────────────────────────

struct CachedKeys {
    keys: JwkSet,
    fetched_at: Instant,
}

/// Verifies Firebase ID tokens (RS256) against Google's rotating key set.
pub struct FirebaseVerifier {
    client: reqwest::Client,
    project_id: String,
    jwks_url: String,
    cache: RwLock<Option<CachedKeys>>,
}

impl FirebaseVerifier {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            project_id: project_id.into(),
            jwks_url: FIREBASE_JWKS_URL.to_string(),
            cache: RwLock::new(None),
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.project_id]);
        validation.set_issuer(&[format!(
            "https://securetoken.google.com/{}",
            self.project_id
        )]);
        validation
    }

    async fn fetch_keys(&self) -> Result<JwkSet, IdentityError> {
        debug!(url = %self.jwks_url, "Fetching identity signing keys");
        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| IdentityError::KeySet(e.to_string()))?
            .error_for_status()
            .map_err(|e| IdentityError::KeySet(e.to_string()))?;

        response
            .json::<JwkSet>()
            .await
            .map_err(|e| IdentityError::KeySet(e.to_string()))
    }

    /// Returns the decoding key for `kid`, refreshing the cache when it is
    /// stale or does not know the key yet.
    async fn key_for(&self, kid: &str) -> Result<DecodingKey, IdentityError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.fetched_at.elapsed() < KEY_CACHE_TTL {
                    if let Some(jwk) = cached.keys.find(kid) {
                        return DecodingKey::from_jwk(jwk)
                            .map_err(|e| IdentityError::KeySet(e.to_string()));
                    }
                }
            }
        }

        let keys = self.fetch_keys().await?;
        let key = keys
            .find(kid)
            .map(DecodingKey::from_jwk)
            .transpose()
            .map_err(|e| IdentityError::KeySet(e.to_string()))?;

        *self.cache.write().await = Some(CachedKeys {
            keys,
            fetched_at: Instant::now(),
        });

        key.ok_or_else(|| IdentityError::InvalidToken(format!("unknown signing key {}", kid)))
    }
}

#[async_trait]
impl IdentityVerifier for FirebaseVerifier {
    #[instrument(skip_all)]
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, IdentityError> {
        let header = decode_header(token).map_err(map_jwt_error)?;
        let kid = header
            .kid
            .ok_or_else(|| IdentityError::InvalidToken("missing key id".into()))?;

        let key = self.key_for(&kid).await?;
        let data = decode::<Claims>(token, &key, &self.validation()).map_err(map_jwt_error)?;

        into_identity(data.claims)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Shared secret
// ─────────────────────────────────────────────────────────────────────────────

/// Verifies HS256 tokens signed with a shared secret.
///
/// Intended for local development and tests, where no external identity
/// provider is available.
pub struct SharedSecretVerifier {
    secret: String,
}

impl SharedSecretVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Issues a token this verifier will accept.
    pub fn sign(&self, email: &str, ttl: Duration) -> Result<String, IdentityError> {
        let claims = Claims {
            sub: email.to_string(),
            email: Some(email.to_string()),
            exp: chrono::Utc::now().timestamp() as u64 + ttl.as_secs(),
        };
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| IdentityError::InvalidToken(e.to_string()))
    }
}

#[async_trait]
impl IdentityVerifier for SharedSecretVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, IdentityError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(map_jwt_error)?;

        into_identity(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_with(secret: &str, claims: &Claims) -> String {
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn now() -> u64 {
        chrono::Utc::now().timestamp() as u64
    }

    #[tokio::test]
    async fn test_signed_token_verifies() {
        let verifier = SharedSecretVerifier::new("s3cret");
        let token = verifier.sign("a@x.com", Duration::from_secs(600)).unwrap();

        let identity = verifier.verify(&token).await.unwrap();

        assert_eq!(identity.email, "a@x.com");
    }

    #[tokio::test]
    async fn test_wrong_secret_rejected() {
        let token = SharedSecretVerifier::new("other")
            .sign("a@x.com", Duration::from_secs(600))
            .unwrap();

        let result = SharedSecretVerifier::new("s3cret").verify(&token).await;

        assert!(matches!(result, Err(IdentityError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let token = token_with(
            "s3cret",
            &Claims {
                sub: "u1".into(),
                email: Some("a@x.com".into()),
                exp: now() - 3600,
            },
        );

        let result = SharedSecretVerifier::new("s3cret").verify(&token).await;

        assert!(matches!(result, Err(IdentityError::Expired)));
    }

    #[tokio::test]
    async fn test_token_without_email_rejected() {
        let token = token_with(
            "s3cret",
            &Claims {
                sub: "u1".into(),
                email: None,
                exp: now() + 600,
            },
        );

        let result = SharedSecretVerifier::new("s3cret").verify(&token).await;

        assert!(matches!(result, Err(IdentityError::MissingEmail)));
    }

    #[tokio::test]
    async fn test_garbage_token_rejected() {
        let result = SharedSecretVerifier::new("s3cret").verify("not-a-jwt").await;
        assert!(matches!(result, Err(IdentityError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn test_firebase_rejects_token_without_key_id() {
        // HS256 token carries no `kid`, so no key lookup happens.
        let token = SharedSecretVerifier::new("s3cret")
            .sign("a@x.com", Duration::from_secs(600))
            .unwrap();

        let result = FirebaseVerifier::new("demo-project").verify(&token).await;

        assert!(matches!(result, Err(IdentityError::InvalidToken(_))));
    }
}
