//! Store abstractions and their implementations.
//!
//! - [`SessionStore`] -- session records keyed by token hash.
//! - [`UserDirectory`] -- user lookup and creation.
//!
//! Each trait has a PostgreSQL implementation (`Pg*Repo`) and an in-memory
//! one (`Memory*Repo`) used for local development and tests.

use async_trait::async_trait;
use tessera_core::types::{DbId, Timestamp};

use crate::error::StoreError;
use crate::models::session::{NewSession, Rotation, Session, SessionSuccessor};
use crate::models::user::{CreateUser, User};

pub mod session_repo;
pub mod user_repo;

pub use session_repo::{MemorySessionRepo, PgSessionRepo};
pub use user_repo::{MemoryUserRepo, PgUserRepo};

/// Persistent session records.
///
/// Every method must be atomic with respect to a single `token_hash`. In
/// particular [`SessionStore::rotate`] is the gate for rotation: when two
/// callers race on the same key, exactly one of them gets
/// [`Rotation::Rotated`].
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a new session. Fails with [`StoreError::Conflict`] if the key exists.
    async fn insert(&self, session: NewSession) -> Result<Session, StoreError>;

    /// Look up a session without modifying it.
    async fn find(&self, token_hash: &str) -> Result<Option<Session>, StoreError>;

    /// Remove the session under `token_hash` and insert `successor` for the
    /// same user as one unit. If the insert fails the old record is kept.
    /// A record already expired at `now` is removed without a successor.
    async fn rotate(
        &self,
        token_hash: &str,
        successor: SessionSuccessor,
        now: Timestamp,
    ) -> Result<Rotation, StoreError>;

    /// Delete a session. Returns `true` if a record existed.
    async fn delete(&self, token_hash: &str) -> Result<bool, StoreError>;

    /// Delete every session whose expiry is at or before `now`.
    async fn delete_expired(&self, now: Timestamp) -> Result<u64, StoreError>;
}

/// User records, consulted by sign-up, sign-in and `/users/me`.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Create a user. Fails with [`StoreError::Conflict`] on a duplicate username.
    async fn create(&self, input: CreateUser) -> Result<User, StoreError>;

    /// Find a user by username (case-sensitive).
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Find a user by internal ID.
    async fn find_by_id(&self, id: DbId) -> Result<Option<User>, StoreError>;
}
