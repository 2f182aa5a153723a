#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use tessera_api::auth::jwt::JwtConfig;
use tessera_api::auth::session::SessionConfig;
use tessera_api::config::ServerConfig;
use tessera_api::router::build_app_router;
use tessera_api::state::AppState;
use tessera_db::repositories::{MemorySessionRepo, MemoryUserRepo};

pub const TEST_PASSWORD: &str = "test_password_123!";

/// Build a test `ServerConfig` with safe defaults and in-memory storage.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        database_url: None,
        session_cleanup_interval_secs: 3600,
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_token_ttl_secs: 600,
        },
        session: SessionConfig::default(),
    }
}

/// A fully wired application plus handles on its stores.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub users: Arc<MemoryUserRepo>,
    pub sessions: Arc<MemorySessionRepo>,
}

/// Build the full application router, with every middleware layer, over
/// fresh in-memory stores.
pub fn build_test_app() -> TestApp {
    build_test_app_with(test_config())
}

pub fn build_test_app_with(config: ServerConfig) -> TestApp {
    let users = Arc::new(MemoryUserRepo::new());
    let sessions = Arc::new(MemorySessionRepo::new());
    let config = Arc::new(config);

    let state = AppState::new(
        Arc::clone(&config),
        users.clone(),
        sessions.clone(),
        None,
    );
    let router = build_app_router(state.clone(), &config);

    TestApp {
        router,
        state,
        users,
        sessions,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn get_auth(app: &Router, uri: &str, access_token: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {access_token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// POST an arbitrary body, with an optional `Content-Type`.
pub async fn post_raw(
    app: &Router,
    uri: &str,
    content_type: Option<&str>,
    body: &'static str,
) -> Response<Body> {
    let mut builder = Request::builder().method(Method::POST).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header(CONTENT_TYPE, content_type);
    }
    send(app, builder.body(Body::from(body)).unwrap()).await
}

/// POST with no body, optionally carrying the session cookie.
pub async fn post_with_cookie(app: &Router, uri: &str, session: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder().method(Method::POST).uri(uri);
    if let Some(token) = session {
        builder = builder.header(COOKIE, format!("refreshToken={token}"));
    }
    send(app, builder.body(Body::empty()).unwrap()).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// The raw `Set-Cookie` header for the session cookie, if the response set one.
pub fn session_set_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("refreshToken="))
        .map(str::to_string)
}

/// The session token value from the response's `Set-Cookie`, if any.
pub fn session_token_from(response: &Response<Body>) -> Option<String> {
    session_set_cookie(response).and_then(|header| {
        header
            .split(';')
            .next()
            .and_then(|pair| pair.strip_prefix("refreshToken="))
            .map(str::to_string)
    })
}

// ---------------------------------------------------------------------------
// Flow helpers
// ---------------------------------------------------------------------------

pub async fn sign_up(app: &Router, username: &str) {
    let body = serde_json::json!({
        "username": username,
        "password": TEST_PASSWORD,
        "email": format!("{username}@example.com"),
        "firstName": "Ada",
        "lastName": "Lovelace",
    });
    let response = post_json(app, "/api/auth/signup", body).await;
    assert_eq!(response.status(), 204, "sign-up of {username} failed");
}

/// A signed-in user: the sign-in body plus the session token from the cookie.
pub struct SignedIn {
    pub user_id: i64,
    pub access_token: String,
    pub session_token: String,
}

pub async fn sign_in(app: &Router, username: &str) -> SignedIn {
    let body = serde_json::json!({ "username": username, "password": TEST_PASSWORD });
    let response = post_json(app, "/api/auth/signin", body).await;
    assert_eq!(response.status(), 200, "sign-in of {username} failed");

    let session_token = session_token_from(&response).expect("sign-in must set the session cookie");
    let json = body_json(response).await;

    SignedIn {
        user_id: json["user"]["id"].as_i64().unwrap(),
        access_token: json["accessToken"].as_str().unwrap().to_string(),
        session_token,
    }
}

pub async fn sign_up_and_in(app: &Router, username: &str) -> SignedIn {
    sign_up(app, username).await;
    sign_in(app, username).await
}
