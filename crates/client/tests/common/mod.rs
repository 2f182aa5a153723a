#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use tessera_api::auth::jwt::JwtConfig;
use tessera_api::auth::session::SessionConfig;
use tessera_api::config::ServerConfig;
use tessera_api::router::build_app_router;
use tessera_api::state::AppState;
use tessera_client::{AuthClient, ClientConfig, SignUp};
use tessera_db::repositories::{MemorySessionRepo, MemoryUserRepo};

pub const PASSWORD: &str = "correct-horse-battery-staple";

/// Serve `router` on an ephemeral local port and return its API root.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/api")
}

/// A running API server over in-memory stores.
pub struct TestServer {
    pub base_url: String,
    pub state: AppState,
    pub sessions: Arc<MemorySessionRepo>,
}

pub async fn spawn_server(access_token_ttl_secs: i64) -> TestServer {
    let config = Arc::new(ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        database_url: None,
        session_cleanup_interval_secs: 3600,
        jwt: JwtConfig {
            secret: "client-test-secret".to_string(),
            access_token_ttl_secs,
        },
        session: SessionConfig {
            cookie_secure: false,
            ..SessionConfig::default()
        },
    });

    let users = Arc::new(MemoryUserRepo::new());
    let sessions = Arc::new(MemorySessionRepo::new());
    let state = AppState::new(Arc::clone(&config), users, sessions.clone(), None);
    let base_url = serve(build_app_router(state.clone(), &config)).await;

    TestServer {
        base_url,
        state,
        sessions,
    }
}

pub fn client(base_url: &str) -> AuthClient {
    AuthClient::new(ClientConfig::new(base_url)).unwrap()
}

pub fn sign_up_form(username: &str) -> SignUp {
    SignUp {
        username: username.to_string(),
        password: PASSWORD.to_string(),
        email: format!("{username}@example.com"),
        first_name: "Alice".to_string(),
        last_name: "Liddell".to_string(),
    }
}

/// Sign `username` up and in through `client`.
pub async fn register(client: &AuthClient, username: &str) {
    client.sign_up(&sign_up_form(username)).await.unwrap();
    client.sign_in(username, PASSWORD).await.unwrap();
}
