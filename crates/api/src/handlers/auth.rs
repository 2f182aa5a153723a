//! Handlers for the `/auth` resource (sign-up, sign-in, sign-out, refresh).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use tessera_core::error::CoreError;
use tessera_db::models::user::{CreateUser, UserResponse};
use tessera_db::StoreError;
use validator::Validate;

use super::validate_body;
use crate::auth::cookie::{removal_cookie, session_cookie, session_token};
use crate::auth::password::{hash_password, verify_password_or_dummy};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Message returned when sign-up hits an existing username.
const DUPLICATE_USERNAME_MESSAGE: &str = "Username already exists";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/signup`.
///
/// Missing fields deserialize as empty strings so they get the per-field
/// validation messages. Unreadable bodies are rejected as validation errors too.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct SignUpRequest {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 1, message = "firstName is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "lastName is required"))]
    pub last_name: String,
}

/// Request body for `POST /auth/signin`.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct SignInRequest {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Response body for a successful sign-in.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    pub message: String,
    pub access_token: String,
    pub user: UserResponse,
}

/// Response body for both refresh endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    pub access_token: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/auth/signup
///
/// Create a user. Returns 204 No Content; 400 on missing fields or a taken username.
pub async fn sign_up(
    State(state): State<AppState>,
    WithRejection(Json(input), _): WithRejection<Json<SignUpRequest>, AppError>,
) -> AppResult<StatusCode> {
    validate_body(&input)?;

    if state.users.find_by_username(&input.username).await?.is_some() {
        return Err(AppError::BadRequest(DUPLICATE_USERNAME_MESSAGE.into()));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let created = state
        .users
        .create(CreateUser {
            display_name: format!("{} {}", input.first_name, input.last_name),
            username: input.username,
            email: input.email,
            password_hash,
        })
        .await;

    match created {
        Ok(user) => {
            tracing::info!(user_id = user.id, "User signed up");
            Ok(StatusCode::NO_CONTENT)
        }
        // Lost a race with a concurrent sign-up for the same name.
        Err(StoreError::Conflict(_)) => Err(AppError::BadRequest(DUPLICATE_USERNAME_MESSAGE.into())),
        Err(e) => Err(e.into()),
    }
}

/// POST /api/auth/signin
///
/// Verify credentials, start a session (cookie) and issue an access credential (body).
/// Unknown user and wrong password produce the same 401 response.
pub async fn sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(input), _): WithRejection<Json<SignInRequest>, AppError>,
) -> AppResult<(CookieJar, Json<SignInResponse>)> {
    validate_body(&input)?;

    let user = state.users.find_by_username(&input.username).await?;
    let password_valid = verify_password_or_dummy(
        &input.password,
        user.as_ref().map(|u| u.password_hash.as_str()),
    )
    .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    let user = match user {
        Some(user) if password_valid => user,
        _ => return Err(CoreError::BadCredentials.into()),
    };

    let access_token = state.tokens.issue(user.id)?;
    let session = state.sessions.create_session(user.id).await?;
    let jar = jar.add(session_cookie(&state.config.session, session.token));

    tracing::info!(user_id = user.id, "User signed in");

    Ok((
        jar,
        Json(SignInResponse {
            message: format!("User {} signed in successfully", user.display_name),
            access_token,
            user: user.into(),
        }),
    ))
}

/// POST /api/auth/signout
///
/// Revoke the session named by the cookie, if any, and clear the cookie.
/// Always 204; signing out twice is not an error.
pub async fn sign_out(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, StatusCode)> {
    let Some(token) = session_token(&jar, &state.config.session) else {
        return Ok((jar, StatusCode::NO_CONTENT));
    };

    state.sessions.revoke_session(&token).await?;
    let jar = jar.add(removal_cookie(&state.config.session));

    Ok((jar, StatusCode::NO_CONTENT))
}

/// POST /api/auth/refresh
///
/// Issue a new access credential for a valid session without rotating it.
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<Json<AccessTokenResponse>> {
    let token = require_session_token(&jar, &state)?;

    let user_id = state.sessions.validate_session(&token).await?;
    let access_token = state.tokens.issue(user_id)?;

    Ok(Json(AccessTokenResponse { access_token }))
}

/// POST /api/auth/refresh-when-unauthorized
///
/// Rotate the session (single use) and issue a new access credential.
/// The successor token replaces the cookie.
pub async fn refresh_when_unauthorized(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<AccessTokenResponse>)> {
    let token = require_session_token(&jar, &state)?;

    let session = state.sessions.rotate_session(&token).await?;
    let access_token = state.tokens.issue(session.user_id)?;
    let jar = jar.add(session_cookie(&state.config.session, session.token));

    Ok((jar, Json(AccessTokenResponse { access_token })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Read the session cookie or reject with 401.
fn require_session_token(jar: &CookieJar, state: &AppState) -> AppResult<String> {
    session_token(jar, &state.config.session).ok_or_else(|| {
        AppError::Core(CoreError::Unauthorized("Session token is missing".into()))
    })
}
