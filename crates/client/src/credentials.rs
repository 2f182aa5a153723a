//! Everything the client knows about its own authentication.
//!
//! The access credential and the current user are readable through
//! [`crate::AuthClient`]; the session token never leaves this module except
//! as a `Cookie` header on `/auth/*` requests.

use cookie::Cookie;
use reqwest::header::{HeaderMap, SET_COOKIE};

use crate::models::UserProfile;
use crate::protocol::{AuthEvent, AuthState, InvalidTransition};

/// What a response's `Set-Cookie` says about the session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SessionUpdate {
    Set(String),
    Removed,
}

#[derive(Debug, Default)]
pub(crate) struct Credentials {
    state: AuthState,
    access_token: Option<String>,
    user: Option<UserProfile>,
    session: Option<String>,
}

impl Credentials {
    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn session(&self) -> Option<&str> {
        self.session.as_deref()
    }

    fn apply(&mut self, event: AuthEvent) -> Result<(), InvalidTransition> {
        self.state = self.state.next(event)?;
        Ok(())
    }

    fn apply_session(&mut self, update: Option<SessionUpdate>) {
        match update {
            Some(SessionUpdate::Set(token)) => self.session = Some(token),
            Some(SessionUpdate::Removed) => self.session = None,
            None => {}
        }
    }

    pub fn signed_in(
        &mut self,
        access_token: String,
        user: UserProfile,
        session: Option<SessionUpdate>,
    ) -> Result<(), InvalidTransition> {
        self.apply(AuthEvent::SignedIn)?;
        self.access_token = Some(access_token);
        self.user = Some(user);
        self.apply_session(session);
        Ok(())
    }

    /// `Authenticated -> AccessRejected -> Refreshing`.
    pub fn begin_refresh(&mut self) -> Result<(), InvalidTransition> {
        self.apply(AuthEvent::AccessRejected)?;
        self.apply(AuthEvent::RefreshStarted)
    }

    pub fn refreshed(
        &mut self,
        access_token: String,
        session: Option<SessionUpdate>,
    ) -> Result<(), InvalidTransition> {
        self.apply(AuthEvent::RefreshSucceeded)?;
        self.access_token = Some(access_token);
        self.apply_session(session);
        Ok(())
    }

    /// Swap the access credential without a rotation (silent refresh).
    pub fn renew_access(&mut self, access_token: String) {
        self.access_token = Some(access_token);
    }

    pub fn refresh_failed(&mut self) {
        if self.apply(AuthEvent::RefreshFailed).is_err() {
            self.state = AuthState::LoggedOut;
        }
        self.discard();
    }

    pub fn signed_out(&mut self) {
        self.state = self
            .state
            .next(AuthEvent::SignedOut)
            .unwrap_or(AuthState::LoggedOut);
        self.discard();
    }

    fn discard(&mut self) {
        self.access_token = None;
        self.user = None;
        self.session = None;
    }
}

/// Read the session cookie named `cookie_name` from a response's headers.
pub(crate) fn session_update(headers: &HeaderMap, cookie_name: &str) -> Option<SessionUpdate> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|raw| Cookie::parse(raw.to_owned()).ok())
        .find(|c| c.name() == cookie_name)
        .map(|c| {
            let expired = c.max_age() == Some(cookie::time::Duration::ZERO);
            if expired || c.value().is_empty() {
                SessionUpdate::Removed
            } else {
                SessionUpdate::Set(c.value().to_string())
            }
        })
}
