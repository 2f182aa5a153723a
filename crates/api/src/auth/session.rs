//! Session lifecycle on top of an injected [`SessionStore`].
//!
//! Sessions are long-lived, opaque, single-use-for-rotation records. The
//! store only ever sees the SHA-256 digest of a token; this module is the
//! one place plaintext tokens are turned into storage keys.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tessera_core::session_token::{generate_session_token, hash_session_token};
use tessera_core::types::{DbId, Timestamp};
use tessera_db::models::session::{NewSession, Rotation, SessionSuccessor};
use tessera_db::repositories::SessionStore;
use tessera_db::StoreError;

/// Default session lifetime in days.
const DEFAULT_SESSION_TTL_DAYS: i64 = 14;

/// Default name of the cookie that carries the session token.
pub const DEFAULT_SESSION_COOKIE_NAME: &str = "refreshToken";

/// Session lifetime and cookie policy.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Session lifetime in days; also the cookie max-age (default: 14).
    pub ttl_days: i64,
    /// Name of the session cookie (default: `refreshToken`).
    pub cookie_name: String,
    /// Whether the cookie carries the `Secure` attribute (default: `true`).
    pub cookie_secure: bool,
}

impl SessionConfig {
    /// Load session configuration from environment variables.
    ///
    /// | Env Var                 | Default        |
    /// |-------------------------|----------------|
    /// | `SESSION_TTL_DAYS`      | `14`           |
    /// | `SESSION_COOKIE_NAME`   | `refreshToken` |
    /// | `SESSION_COOKIE_SECURE` | `true`         |
    pub fn from_env() -> Self {
        let ttl_days: i64 = std::env::var("SESSION_TTL_DAYS")
            .unwrap_or_else(|_| DEFAULT_SESSION_TTL_DAYS.to_string())
            .parse()
            .expect("SESSION_TTL_DAYS must be a valid i64");

        let cookie_name = std::env::var("SESSION_COOKIE_NAME")
            .unwrap_or_else(|_| DEFAULT_SESSION_COOKIE_NAME.into());

        let cookie_secure: bool = std::env::var("SESSION_COOKIE_SECURE")
            .unwrap_or_else(|_| "true".into())
            .parse()
            .expect("SESSION_COOKIE_SECURE must be `true` or `false`");

        Self {
            ttl_days,
            cookie_name,
            cookie_secure,
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::days(self.ttl_days)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_days: DEFAULT_SESSION_TTL_DAYS,
            cookie_name: DEFAULT_SESSION_COOKIE_NAME.to_string(),
            cookie_secure: true,
        }
    }
}

/// Why a session operation failed.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No record for the token: never issued, already rotated, or revoked.
    #[error("session is invalid")]
    InvalidSession,

    #[error("session has expired")]
    ExpiredSession,

    #[error("session storage failed: {0}")]
    Storage(#[from] StoreError),
}

/// A session that was just created. `token` is the plaintext for the cookie.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub user_id: DbId,
    pub expires_at: Timestamp,
}

/// Creates, rotates, revokes and validates sessions.
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, config: &SessionConfig) -> Self {
        Self {
            store,
            ttl: config.ttl(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Start a new session for `user_id` and return its plaintext token.
    pub async fn create_session(&self, user_id: DbId) -> Result<IssuedSession, SessionError> {
        let generated = generate_session_token();
        let expires_at = Utc::now() + self.ttl;

        self.store
            .insert(NewSession {
                token_hash: generated.hash,
                user_id,
                expires_at,
            })
            .await?;

        Ok(IssuedSession {
            token: generated.plaintext,
            user_id,
            expires_at,
        })
    }

    /// Replace `old_token` with a fresh session for the same user.
    ///
    /// The store removes the old record and inserts the successor as one
    /// unit, so of two concurrent rotations of the same token exactly one
    /// succeeds and the other sees [`SessionError::InvalidSession`]. A failed
    /// insert leaves the old session usable.
    pub async fn rotate_session(&self, old_token: &str) -> Result<IssuedSession, SessionError> {
        let generated = generate_session_token();
        let now = Utc::now();
        let successor = SessionSuccessor {
            token_hash: generated.hash,
            expires_at: now + self.ttl,
        };

        let rotation = self
            .store
            .rotate(&hash_session_token(old_token), successor, now)
            .await?;

        match rotation {
            Rotation::Rotated(next) => {
                tracing::debug!(user_id = next.user_id, "Session rotated");
                Ok(IssuedSession {
                    token: generated.plaintext,
                    user_id: next.user_id,
                    expires_at: next.expires_at,
                })
            }
            Rotation::Missing => Err(SessionError::InvalidSession),
            Rotation::Expired(previous) => {
                tracing::debug!(user_id = previous.user_id, "Refused rotation of expired session");
                Err(SessionError::ExpiredSession)
            }
        }
    }

    /// Delete the session for `token`. Absent sessions are not an error.
    pub async fn revoke_session(&self, token: &str) -> Result<(), SessionError> {
        let existed = self.store.delete(&hash_session_token(token)).await?;
        tracing::debug!(existed, "Session revoked");
        Ok(())
    }

    /// Resolve `token` to its user without modifying anything.
    pub async fn validate_session(&self, token: &str) -> Result<DbId, SessionError> {
        let session = self
            .store
            .find(&hash_session_token(token))
            .await?
            .ok_or(SessionError::InvalidSession)?;

        if session.is_expired_at(Utc::now()) {
            return Err(SessionError::ExpiredSession);
        }
        Ok(session.user_id)
    }

    /// Physically remove sessions that have already expired.
    pub async fn purge_expired(&self) -> Result<u64, SessionError> {
        Ok(self.store.delete_expired(Utc::now()).await?)
    }
}
