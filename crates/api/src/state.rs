use std::sync::Arc;

use tessera_db::repositories::{SessionStore, UserDirectory};
use tessera_db::DbPool;

use crate::auth::jwt::TokenIssuer;
use crate::auth::session::SessionManager;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (everything inside is behind `Arc` or is a pool handle).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration, read once at startup.
    pub config: Arc<ServerConfig>,
    /// Signs and verifies access credentials.
    pub tokens: Arc<TokenIssuer>,
    /// Session lifecycle over the injected session store.
    pub sessions: Arc<SessionManager>,
    /// User lookup and creation.
    pub users: Arc<dyn UserDirectory>,
    /// Database pool, when running against PostgreSQL. Used by the health check.
    pub pool: Option<DbPool>,
}

impl AppState {
    /// Wire the token issuer and session manager from `config` around the given stores.
    pub fn new(
        config: Arc<ServerConfig>,
        users: Arc<dyn UserDirectory>,
        session_store: Arc<dyn SessionStore>,
        pool: Option<DbPool>,
    ) -> Self {
        let tokens = Arc::new(TokenIssuer::new(&config.jwt));
        let sessions = Arc::new(SessionManager::new(session_store, &config.session));
        Self {
            config,
            tokens,
            sessions,
            users,
            pool,
        }
    }
}
