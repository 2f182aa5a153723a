//! Session model and DTOs.

use sqlx::FromRow;
use tessera_core::types::{DbId, Timestamp};

/// A row from the `sessions` table.
///
/// `token_hash` is the SHA-256 digest of the plaintext session token and is
/// the primary key. The plaintext is never stored.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub token_hash: String,
    pub user_id: DbId,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}

impl Session {
    /// Whether the session is past its expiry at `now`.
    ///
    /// Expired rows may still be physically present until the reaper runs.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.expires_at <= now
    }
}

/// DTO for inserting a new session.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub token_hash: String,
    pub user_id: DbId,
    pub expires_at: Timestamp,
}

/// The replacement half of a rotation. The user is carried over from the
/// record being replaced.
#[derive(Debug, Clone)]
pub struct SessionSuccessor {
    pub token_hash: String,
    pub expires_at: Timestamp,
}

/// Outcome of [`SessionStore::rotate`](crate::repositories::SessionStore::rotate).
#[derive(Debug)]
pub enum Rotation {
    /// The old record is gone and this is its successor.
    Rotated(Session),
    /// No record exists under the old key, or another caller already took it.
    Missing,
    /// The old record had expired. It has been removed and nothing was inserted.
    Expired(Session),
}
