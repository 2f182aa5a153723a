//! Handlers for the `/users` resource.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tessera_core::error::CoreError;
use tessera_db::models::user::UserResponse;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Response body for `GET /users/me`.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: UserResponse,
}

/// GET /api/users/me
///
/// Return the user the access credential was issued for. 404 if that user
/// no longer exists.
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<MeResponse>> {
    let user = state
        .users
        .find_by_id(auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;

    Ok(Json(MeResponse { user: user.into() }))
}
