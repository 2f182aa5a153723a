//! Route definitions for the `/auth` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /signup                     -> sign_up
/// POST /signin                     -> sign_in
/// POST /signout                    -> sign_out
/// POST /refresh                    -> refresh
/// POST /refresh-when-unauthorized  -> refresh_when_unauthorized
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::sign_up))
        .route("/signin", post(auth::sign_in))
        .route("/signout", post(auth::sign_out))
        .route("/refresh", post(auth::refresh))
        .route(
            "/refresh-when-unauthorized",
            post(auth::refresh_when_unauthorized),
        )
}
