//! The authenticating HTTP client and its retry interceptor.

use std::sync::Arc;

use reqwest::header::COOKIE;
use reqwest::{Client, Method, Response, StatusCode};
use tokio::sync::{Mutex, RwLock};

use crate::config::ClientConfig;
use crate::credentials::{session_update, Credentials, SessionUpdate};
use crate::error::{ensure_success, ClientError};
use crate::models::{AccessTokenReply, MeReply, SignInBody, SignInReply, SignUp, UserProfile};
use crate::protocol::{is_auth_endpoint, AuthState, RetryBudget};

const SIGNUP_PATH: &str = "/auth/signup";
const SIGNIN_PATH: &str = "/auth/signin";
const SIGNOUT_PATH: &str = "/auth/signout";
const REFRESH_PATH: &str = "/auth/refresh";
const ROTATE_PATH: &str = "/auth/refresh-when-unauthorized";
const ME_PATH: &str = "/users/me";

/// A protected call, kept so it can be replayed after a refresh.
#[derive(Debug, Clone)]
pub struct OutboundCall {
    method: Method,
    path: String,
    body: Option<serde_json::Value>,
}

impl OutboundCall {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn with_json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Result of one refresh exchange with the server.
struct Exchange {
    access_token: String,
    session: Option<SessionUpdate>,
}

/// HTTP client that signs in, attaches the access credential to protected
/// calls and transparently rotates the session when a call is refused.
///
/// Clones share one credential set: refreshes are serialized so concurrent
/// failures across tasks produce a single rotation.
#[derive(Clone)]
pub struct AuthClient {
    inner: Arc<Inner>,
}

struct Inner {
    http: Client,
    config: ClientConfig,
    credentials: RwLock<Credentials>,
    /// Held for the duration of any exchange that changes the session.
    refresh_lock: Mutex<()>,
}

impl AuthClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                config,
                credentials: RwLock::new(Credentials::default()),
                refresh_lock: Mutex::new(()),
            }),
        })
    }

    pub async fn state(&self) -> AuthState {
        self.inner.credentials.read().await.state()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state().await.is_authenticated()
    }

    pub async fn current_user(&self) -> Option<UserProfile> {
        self.inner.credentials.read().await.user().cloned()
    }

    /// The access credential currently attached to protected calls.
    pub async fn access_token(&self) -> Option<String> {
        self.inner
            .credentials
            .read()
            .await
            .access_token()
            .map(str::to_string)
    }

    pub async fn sign_up(&self, input: &SignUp) -> Result<(), ClientError> {
        let inner = &self.inner;
        let response = inner
            .http
            .post(inner.url(SIGNUP_PATH))
            .json(input)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    /// Sign in and keep the returned access credential and session cookie.
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<UserProfile, ClientError> {
        let inner = &self.inner;
        let _guard = inner.refresh_lock.lock().await;

        let response = inner
            .http
            .post(inner.url(SIGNIN_PATH))
            .json(&SignInBody { username, password })
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let session = session_update(response.headers(), &inner.config.cookie_name);
        let reply: SignInReply = response.json().await?;

        inner
            .credentials
            .write()
            .await
            .signed_in(reply.access_token, reply.user.clone(), session)?;
        tracing::debug!(user_id = reply.user.id, "Signed in");

        Ok(reply.user)
    }

    /// Revoke the session on the server and discard local credentials.
    ///
    /// Local state is cleared even when the server cannot be reached.
    pub async fn sign_out(&self) -> Result<(), ClientError> {
        let inner = &self.inner;
        let _guard = inner.refresh_lock.lock().await;

        let session = inner.credentials.read().await.session().map(str::to_string);
        let mut request = inner.http.post(inner.url(SIGNOUT_PATH));
        if let Some(token) = &session {
            request = request.header(COOKIE, inner.cookie_header(token));
        }
        let outcome = request.send().await;

        inner.credentials.write().await.signed_out();
        tracing::debug!("Signed out");

        ensure_success(outcome?).await?;
        Ok(())
    }

    pub async fn me(&self) -> Result<UserProfile, ClientError> {
        let response = self.send(OutboundCall::get(ME_PATH)).await?;
        let reply: MeReply = response.json().await?;
        Ok(reply.user)
    }

    /// Obtain a new access credential without rotating the session.
    pub async fn refresh_silently(&self) -> Result<(), ClientError> {
        let inner = &self.inner;
        let _guard = inner.refresh_lock.lock().await;

        match inner.exchange(REFRESH_PATH).await {
            Ok(exchange) => {
                inner
                    .credentials
                    .write()
                    .await
                    .renew_access(exchange.access_token);
                Ok(())
            }
            Err(ClientError::Api { status, .. })
                if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN =>
            {
                inner.credentials.write().await.signed_out();
                Err(ClientError::SessionEnded)
            }
            Err(e) => Err(e),
        }
    }

    /// Send a protected call with the held access credential.
    ///
    /// A 403 from a non-auth endpoint triggers a refresh and a replay, at
    /// most `max_refresh_attempts` times; after that the 403 is returned.
    /// A failed refresh clears local state and yields
    /// [`ClientError::SessionEnded`] or [`ClientError::RefreshTimedOut`].
    ///
    /// Dropping the returned future mid-refresh does not abandon the
    /// refresh: it runs to completion on its own task.
    pub async fn send(&self, call: OutboundCall) -> Result<Response, ClientError> {
        let mut budget = RetryBudget::new(self.inner.config.max_refresh_attempts);
        let mut access = self.access_token().await;

        loop {
            let response = self.inner.dispatch(&call, access.as_deref()).await?;

            if response.status() != StatusCode::FORBIDDEN || is_auth_endpoint(&call.path) {
                return ensure_success(response).await;
            }
            let Some(rejected) = access else {
                return ensure_success(response).await;
            };
            budget = match budget.consume() {
                Some(next) => next,
                None => {
                    tracing::warn!(path = %call.path, "Refresh budget exhausted");
                    return ensure_success(response).await;
                }
            };

            access = Some(self.refresh_after_rejection(rejected).await?);
            tracing::debug!(path = %call.path, remaining = budget.remaining(), "Replaying call");
        }
    }

    /// Run the refresh cycle for `rejected` on a spawned task and wait for it.
    async fn refresh_after_rejection(&self, rejected: String) -> Result<String, ClientError> {
        let inner = Arc::clone(&self.inner);
        let cycle = tokio::spawn(async move { inner.refresh_cycle(&rejected).await });

        match cycle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(error = %e, "Refresh task did not complete");
                Err(ClientError::SessionEnded)
            }
        }
    }
}

impl Inner {
    /// Run one refresh cycle for the credential `rejected`, or reuse the
    /// credential another task already obtained.
    async fn refresh_cycle(&self, rejected: &str) -> Result<String, ClientError> {
        let _guard = self.refresh_lock.lock().await;

        {
            let mut creds = self.credentials.write().await;
            match creds.access_token() {
                None => return Err(ClientError::SessionEnded),
                Some(current) if current != rejected => return Ok(current.to_string()),
                Some(_) => {}
            }
            if creds.begin_refresh().is_err() {
                creds.refresh_failed();
                return Err(ClientError::SessionEnded);
            }
        }

        let outcome = tokio::time::timeout(self.config.refresh_timeout, self.exchange(ROTATE_PATH)).await;

        let mut creds = self.credentials.write().await;
        match outcome {
            Ok(Ok(exchange)) => {
                if let Err(e) = creds.refreshed(exchange.access_token.clone(), exchange.session) {
                    creds.refresh_failed();
                    return Err(e.into());
                }
                tracing::debug!("Session rotated");
                Ok(exchange.access_token)
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Session refresh failed, signing out");
                creds.refresh_failed();
                Err(ClientError::SessionEnded)
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.config.refresh_timeout.as_millis() as u64,
                    "Session refresh timed out, signing out"
                );
                creds.refresh_failed();
                Err(ClientError::RefreshTimedOut)
            }
        }
    }

    /// POST to a refresh endpoint with the session cookie.
    async fn exchange(&self, path: &str) -> Result<Exchange, ClientError> {
        let session = self
            .credentials
            .read()
            .await
            .session()
            .map(str::to_string)
            .ok_or(ClientError::SessionEnded)?;

        let response = self
            .http
            .post(self.url(path))
            .header(COOKIE, self.cookie_header(&session))
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let session = session_update(response.headers(), &self.config.cookie_name);
        let reply: AccessTokenReply = response.json().await?;

        Ok(Exchange {
            access_token: reply.access_token,
            session,
        })
    }

    async fn dispatch(&self, call: &OutboundCall, access: Option<&str>) -> Result<Response, ClientError> {
        let mut request = self.http.request(call.method.clone(), self.url(&call.path));
        if let Some(token) = access {
            request = request.bearer_auth(token);
        }
        if let Some(body) = &call.body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    fn cookie_header(&self, token: &str) -> String {
        format!("{}={}", self.config.cookie_name, token)
    }
}
