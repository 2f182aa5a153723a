//! User directory implementations for the `users` table and for memory.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use tessera_core::types::DbId;
use tokio::sync::RwLock;

use super::UserDirectory;
use crate::error::StoreError;
use crate::models::user::{CreateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, username, email, password_hash, display_name, created_at";

/// PostgreSQL-backed user directory.
#[derive(Clone)]
pub struct PgUserRepo {
    pool: PgPool,
}

impl PgUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserRepo {
    async fn create(&self, input: CreateUser) -> Result<User, StoreError> {
        let query = format!(
            "INSERT INTO users (username, email, password_hash, display_name)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.display_name)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE username = $1");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

#[derive(Default)]
struct MemoryUsers {
    next_id: DbId,
    by_id: HashMap<DbId, User>,
}

/// In-memory user directory. IDs start at 1 and increase monotonically.
#[derive(Default)]
pub struct MemoryUserRepo {
    inner: RwLock<MemoryUsers>,
}

impl MemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove a user. Returns `true` if the user existed.
    pub async fn remove(&self, id: DbId) -> bool {
        self.inner.write().await.by_id.remove(&id).is_some()
    }
}

#[async_trait]
impl UserDirectory for MemoryUserRepo {
    async fn create(&self, input: CreateUser) -> Result<User, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.by_id.values().any(|u| u.username == input.username) {
            return Err(StoreError::Conflict("uq_users_username".to_string()));
        }
        inner.next_id += 1;
        let user = User {
            id: inner.next_id,
            username: input.username,
            email: input.email,
            password_hash: input.password_hash,
            display_name: input.display_name,
            created_at: chrono::Utc::now(),
        };
        inner.by_id.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_id
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<User>, StoreError> {
        Ok(self.inner.read().await.by_id.get(&id).cloned())
    }
}
