//! Access credential issuance and verification.
//!
//! Access credentials are HS256-signed JWTs carrying only the user id, an
//! issue time, an expiry and a random `jti`. They are never stored server
//! side; the only thing that ends their validity is the clock.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tessera_core::types::{DbId, Timestamp};
use uuid::Uuid;

/// JWT claims embedded in every access credential.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the user's internal database id.
    pub sub: DbId,
    /// Expiration time (UTC Unix timestamp, seconds).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp, seconds).
    pub iat: i64,
    /// Unique token identifier (UUID v4) for audit trails.
    pub jti: String,
}

/// Configuration for access credential signing.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify credentials.
    pub secret: String,
    /// Access credential lifetime in seconds (default: 600).
    pub access_token_ttl_secs: i64,
}

/// Default access credential lifetime: 10 minutes.
const DEFAULT_ACCESS_TTL_SECS: i64 = 10 * 60;

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var                 | Required | Default |
    /// |-------------------------|----------|---------|
    /// | `ACCESS_TOKEN_SECRET`   | **yes**  | --      |
    /// | `ACCESS_TOKEN_TTL_SECS` | no       | `600`   |
    ///
    /// # Panics
    ///
    /// Panics if `ACCESS_TOKEN_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let secret = std::env::var("ACCESS_TOKEN_SECRET")
            .expect("ACCESS_TOKEN_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "ACCESS_TOKEN_SECRET must not be empty");

        let access_token_ttl_secs: i64 = std::env::var("ACCESS_TOKEN_TTL_SECS")
            .unwrap_or_else(|_| DEFAULT_ACCESS_TTL_SECS.to_string())
            .parse()
            .expect("ACCESS_TOKEN_TTL_SECS must be a valid i64");

        Self {
            secret,
            access_token_ttl_secs,
        }
    }
}

/// Why an access credential was refused.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Malformed, tampered, signed with another key, or signed with another algorithm.
    #[error("access token signature is invalid")]
    InvalidSignature,

    #[error("access token has expired")]
    Expired,

    #[error("failed to sign access token: {0}")]
    Signing(String),
}

/// Signs and verifies access credentials with a server-held key.
///
/// Built once at startup from [`JwtConfig`] and shared through the app state.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(config: &JwtConfig) -> Self {
        // Only HS256 is accepted. Expiry is checked by hand in `verify_at` so
        // the boundary is exact (no leeway) and testable with an explicit clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            ttl: Duration::seconds(config.access_token_ttl_secs),
        }
    }

    /// Lifetime of every credential this issuer signs.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a credential for `user_id`, valid from now for the configured TTL.
    pub fn issue(&self, user_id: DbId) -> Result<String, TokenError> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issue a credential as if the current time were `now`.
    ///
    /// Claims hold whole seconds, so `now` is truncated before `ttl` is added.
    pub fn issue_at(&self, user_id: DbId, now: Timestamp) -> Result<String, TokenError> {
        let iat = now.timestamp();
        let claims = Claims {
            sub: user_id,
            exp: iat + self.ttl.num_seconds(),
            iat,
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify a credential and return the user id it was issued for.
    pub fn verify(&self, token: &str) -> Result<DbId, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a credential as if the current time were `now`.
    ///
    /// A credential issued at `T` is accepted while `floor(now) < floor(T) + ttl`.
    /// At whole-second issue times that is exactly `T <= now < T + ttl`. A
    /// credential issued at a fractional second expires up to one second
    /// before `T + ttl`, never after it.
    pub fn verify_at(&self, token: &str, now: Timestamp) -> Result<DbId, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| TokenError::InvalidSignature)?;

        if now.timestamp() >= data.claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(data.claims.sub)
    }
}
