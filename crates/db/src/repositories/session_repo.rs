//! Session store implementations for the `sessions` table and for memory.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use tessera_core::types::Timestamp;
use tokio::sync::RwLock;

use super::SessionStore;
use crate::error::StoreError;
use crate::models::session::{NewSession, Rotation, Session, SessionSuccessor};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "token_hash, user_id, expires_at, created_at";

/// PostgreSQL-backed session store.
#[derive(Clone)]
pub struct PgSessionRepo {
    pool: PgPool,
}

impl PgSessionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionRepo {
    async fn insert(&self, session: NewSession) -> Result<Session, StoreError> {
        let query = format!(
            "INSERT INTO sessions (token_hash, user_id, expires_at)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, Session>(&query)
            .bind(&session.token_hash)
            .bind(session.user_id)
            .bind(session.expires_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find(&self, token_hash: &str) -> Result<Option<Session>, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM sessions WHERE token_hash = $1");
        let row = sqlx::query_as::<_, Session>(&query)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Runs in one transaction. `DELETE ... RETURNING` locks the row, so of
    /// two concurrent callers only the one whose delete removed it receives
    /// it; the other waits and then finds nothing. A failed insert rolls the
    /// delete back when `tx` is dropped.
    async fn rotate(
        &self,
        token_hash: &str,
        successor: SessionSuccessor,
        now: Timestamp,
    ) -> Result<Rotation, StoreError> {
        let mut tx = self.pool.begin().await?;

        let delete = format!("DELETE FROM sessions WHERE token_hash = $1 RETURNING {COLUMNS}");
        let previous = sqlx::query_as::<_, Session>(&delete)
            .bind(token_hash)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(previous) = previous else {
            return Ok(Rotation::Missing);
        };

        if previous.is_expired_at(now) {
            tx.commit().await?;
            return Ok(Rotation::Expired(previous));
        }

        let insert = format!(
            "INSERT INTO sessions (token_hash, user_id, expires_at)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        let next = sqlx::query_as::<_, Session>(&insert)
            .bind(&successor.token_hash)
            .bind(previous.user_id)
            .bind(successor.expires_at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Rotation::Rotated(next))
    }

    async fn delete(&self, token_hash: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired(&self, now: Timestamp) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

/// In-memory session store.
///
/// Each operation runs inside a single lock section and never awaits while
/// holding it, so `rotate` has the same single-winner and all-or-nothing
/// guarantees as the PostgreSQL implementation.
#[derive(Default)]
pub struct MemorySessionRepo {
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemorySessionRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held, expired ones included.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionRepo {
    async fn insert(&self, session: NewSession) -> Result<Session, StoreError> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.token_hash) {
            return Err(StoreError::Conflict("sessions_pkey".to_string()));
        }
        let row = Session {
            token_hash: session.token_hash,
            user_id: session.user_id,
            expires_at: session.expires_at,
            created_at: chrono::Utc::now(),
        };
        sessions.insert(row.token_hash.clone(), row.clone());
        Ok(row)
    }

    async fn find(&self, token_hash: &str) -> Result<Option<Session>, StoreError> {
        Ok(self.sessions.read().await.get(token_hash).cloned())
    }

    async fn rotate(
        &self,
        token_hash: &str,
        successor: SessionSuccessor,
        now: Timestamp,
    ) -> Result<Rotation, StoreError> {
        let mut sessions = self.sessions.write().await;

        let Some(previous) = sessions.get(token_hash).cloned() else {
            return Ok(Rotation::Missing);
        };

        if previous.is_expired_at(now) {
            sessions.remove(token_hash);
            return Ok(Rotation::Expired(previous));
        }

        if sessions.contains_key(&successor.token_hash) {
            return Err(StoreError::Conflict("sessions_pkey".to_string()));
        }

        sessions.remove(token_hash);
        let next = Session {
            token_hash: successor.token_hash,
            user_id: previous.user_id,
            expires_at: successor.expires_at,
            created_at: chrono::Utc::now(),
        };
        sessions.insert(next.token_hash.clone(), next.clone());
        Ok(Rotation::Rotated(next))
    }

    async fn delete(&self, token_hash: &str) -> Result<bool, StoreError> {
        Ok(self.sessions.write().await.remove(token_hash).is_some())
    }

    async fn delete_expired(&self, now: Timestamp) -> Result<u64, StoreError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired_at(now));
        Ok((before - sessions.len()) as u64)
    }
}
