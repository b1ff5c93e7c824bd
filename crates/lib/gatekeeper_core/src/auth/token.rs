//! Bearer token issuance and validation.
//!
//! Tokens are signed HS256 JWTs carrying the subject user id and an expiry.
//! They are never persisted; a token stops working only when it expires or
//! the signing secret rotates.

use std::path::PathBuf;

use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode as jwt_decode,
    encode as jwt_encode,
};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::AuthError;

/// Default access token lifetime: 30 minutes.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;

/// Claims embedded in access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: user id (standard JWT `sub` claim, uuid in string form).
    pub sub: String,
    /// Expiry (unix timestamp).
    pub exp: i64,
    /// Issued at (unix timestamp).
    pub iat: i64,
}

/// Signing material and default token lifetime.
///
/// Constructed once at process startup and passed into every issue/decode
/// call; request handling never reads the secret from ambient state.
#[derive(Clone)]
pub struct SigningConfig {
    secret: String,
    ttl: Duration,
}

impl SigningConfig {
    pub fn new(secret: impl Into<String>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    /// Signing config with the default 30-minute token lifetime.
    pub fn with_default_ttl(secret: impl Into<String>) -> Self {
        Self::new(secret, Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn secret_bytes(&self) -> &[u8] {
        self.secret.as_bytes()
    }
}

impl std::fmt::Debug for SigningConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The secret must never reach logs.
        f.debug_struct("SigningConfig")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// Issue a signed access token for the given subject.
///
/// An explicit `ttl` overrides the configured default lifetime.
pub fn issue(
    config: &SigningConfig,
    subject: Uuid,
    ttl: Option<Duration>,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = TokenClaims {
        sub: subject.to_string(),
        exp: (now + ttl.unwrap_or_else(|| config.ttl())).timestamp(),
        iat: now.timestamp(),
    };
    jwt_encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret_bytes()),
    )
    .map_err(|e| AuthError::Internal(format!("jwt encode: {e}")))
}

/// Verify a token's signature and expiry, returning the subject user id.
///
/// Any failure (bad signature, malformed payload, missing or non-uuid `sub`,
/// expired token) collapses into [`AuthError::InvalidToken`]. There is no
/// partial acceptance.
pub fn decode(config: &SigningConfig, token: &str) -> Result<Uuid, AuthError> {
    let key = DecodingKey::from_secret(config.secret_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = jwt_decode::<TokenClaims>(token, &key, &validation)
        .map_err(|_| AuthError::InvalidToken)?;

    Uuid::parse_str(&data.claims.sub).map_err(|_| AuthError::InvalidToken)
}

/// Resolve the signing secret: env var `JWT_SECRET` → `AUTH_SECRET` →
/// persisted file (generated on first run).
pub fn resolve_secret() -> String {
    for var in ["JWT_SECRET", "AUTH_SECRET"] {
        if let Ok(secret) = std::env::var(var) {
            if !secret.is_empty() {
                return secret;
            }
        }
    }
    // Generate and persist
    let secret_path = secret_path();
    if let Ok(existing) = std::fs::read_to_string(&secret_path) {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    let secret: String = rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect();
    if let Some(parent) = secret_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let _ = std::fs::write(&secret_path, &secret);
    info!(path = %secret_path.display(), "generated new signing secret");
    secret
}

/// Path to the persisted signing secret file.
fn secret_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gatekeeper")
        .join("signing-secret")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SigningConfig {
        SigningConfig::with_default_ttl("test-secret")
    }

    #[test]
    fn issue_then_decode_returns_subject() {
        let subject = Uuid::new_v4();
        let token = issue(&config(), subject, None).unwrap();
        assert_eq!(decode(&config(), &token).unwrap(), subject);
    }

    #[test]
    fn explicit_ttl_overrides_default() {
        let subject = Uuid::new_v4();
        let token = issue(&config(), subject, Some(Duration::hours(2))).unwrap();
        assert_eq!(decode(&config(), &token).unwrap(), subject);
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = issue(&config(), Uuid::new_v4(), Some(Duration::seconds(-30))).unwrap();
        assert!(matches!(
            decode(&config(), &token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let token = issue(&config(), Uuid::new_v4(), None).unwrap();
        // Flip a byte in the signature segment.
        let mut bytes = token.into_bytes();
        let last = bytes.len() - 1;
        bytes[last] = if bytes[last] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();
        assert!(matches!(
            decode(&config(), &tampered),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue(&config(), Uuid::new_v4(), None).unwrap();
        let other = SigningConfig::with_default_ttl("other-secret");
        assert!(matches!(decode(&other, &token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(matches!(
            decode(&config(), "not-a-real-token"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn non_uuid_subject_is_rejected() {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: "not-a-uuid".into(),
            exp: (now + Duration::minutes(5)).timestamp(),
            iat: now.timestamp(),
        };
        let token = jwt_encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert!(matches!(
            decode(&config(), &token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn debug_never_prints_the_secret() {
        let rendered = format!("{:?}", config());
        assert!(!rendered.contains("test-secret"));
    }
}
