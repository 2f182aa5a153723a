pub mod auth;
pub mod health;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/signup                       create user (public)
/// /auth/signin                       start session (public)
/// /auth/signout                      end session (cookie)
/// /auth/refresh                      new access token, session unchanged (cookie)
/// /auth/refresh-when-unauthorized    new access token, session rotated (cookie)
///
/// /users/me                          current user (requires auth)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
}
