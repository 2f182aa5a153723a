//! The refresh protocol as a pure state machine, plus the retry budget.

/// Where the client stands with respect to authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    Unauthenticated,
    /// Holds a live access credential.
    Authenticated,
    /// The server refused the held access credential.
    AccessRejected,
    /// A session rotation is in flight.
    Refreshing,
    /// Local credentials were discarded. Behaves like `Unauthenticated`.
    LoggedOut,
}

/// Inputs that move the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn,
    AccessRejected,
    RefreshStarted,
    RefreshSucceeded,
    RefreshFailed,
    SignedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("event {event:?} is not valid in state {state:?}")]
pub struct InvalidTransition {
    pub state: AuthState,
    pub event: AuthEvent,
}

impl AuthState {
    /// Apply `event`, returning the next state.
    pub fn next(self, event: AuthEvent) -> Result<AuthState, InvalidTransition> {
        use AuthEvent as E;
        use AuthState as S;

        match (self, event) {
            (_, E::SignedOut) => Ok(S::LoggedOut),
            (S::Unauthenticated | S::LoggedOut | S::Authenticated, E::SignedIn) => {
                Ok(S::Authenticated)
            }
            (S::Authenticated, E::AccessRejected) => Ok(S::AccessRejected),
            (S::AccessRejected, E::RefreshStarted) => Ok(S::Refreshing),
            (S::Refreshing, E::RefreshSucceeded) => Ok(S::Authenticated),
            (S::Refreshing, E::RefreshFailed) => Ok(S::LoggedOut),
            (state, event) => Err(InvalidTransition { state, event }),
        }
    }

    pub fn is_authenticated(self) -> bool {
        self == AuthState::Authenticated
    }
}

/// How many more refresh cycles the current originating call may trigger.
///
/// Immutable: consuming an attempt yields a new budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryBudget {
    remaining: u32,
}

impl RetryBudget {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            remaining: max_attempts,
        }
    }

    pub fn remaining(self) -> u32 {
        self.remaining
    }

    /// Spend one attempt. `None` once the budget is exhausted.
    pub fn consume(self) -> Option<Self> {
        self.remaining
            .checked_sub(1)
            .map(|remaining| Self { remaining })
    }
}

/// Paths (relative to the API root) that never trigger a refresh.
pub const AUTH_ENDPOINTS: [&str; 5] = [
    "/auth/signin",
    "/auth/signup",
    "/auth/signout",
    "/auth/refresh",
    "/auth/refresh-when-unauthorized",
];

/// Whether `path` is one of the authentication endpoints.
pub fn is_auth_endpoint(path: &str) -> bool {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    let path = path.trim_end_matches('/');
    AUTH_ENDPOINTS.contains(&path)
}
