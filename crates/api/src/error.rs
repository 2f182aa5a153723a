use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tessera_core::error::{CoreError, BAD_CREDENTIALS_MESSAGE};
use tessera_db::StoreError;

use crate::auth::jwt::TokenError;
use crate::auth::session::SessionError;

/// Application-level error type for HTTP handlers.
///
/// Every failure kind produced below the HTTP boundary converts into this
/// type, and [`IntoResponse`] is the only place kinds become status codes.
/// Responses are always `{ "error": <message>, "code": <CODE> }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `tessera_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A store failure not handled by the caller.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A session lifecycle failure.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// An access credential failure.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a message that is logged, never returned.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

/// Bodies that are not JSON, have the wrong content type, or do not fit the
/// request shape are validation failures like any other bad input.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Core(CoreError::Validation(rejection.body_text()))
    }
}

/// Generic body for every 500 response.
const INTERNAL_MESSAGE: &str = "An internal error occurred";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::BadCredentials => (
                    StatusCode::UNAUTHORIZED,
                    "UNAUTHORIZED",
                    BAD_CREDENTIALS_MESSAGE.to_string(),
                ),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
            },

            AppError::Store(err) => classify_store_error(err),

            AppError::Session(err) => match err {
                SessionError::InvalidSession => (
                    StatusCode::FORBIDDEN,
                    "INVALID_SESSION",
                    "Session is invalid".to_string(),
                ),
                SessionError::ExpiredSession => (
                    StatusCode::FORBIDDEN,
                    "EXPIRED_SESSION",
                    "Session has expired".to_string(),
                ),
                SessionError::Storage(store) => classify_store_error(store),
            },

            AppError::Token(err) => match err {
                TokenError::InvalidSignature => (
                    StatusCode::FORBIDDEN,
                    "INVALID_TOKEN",
                    "Access token is invalid".to_string(),
                ),
                TokenError::Expired => (
                    StatusCode::FORBIDDEN,
                    "TOKEN_EXPIRED",
                    "Access token has expired".to_string(),
                ),
                TokenError::Signing(msg) => internal(msg),
            },

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => internal(msg),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Log the detail server side and hand the caller a generic 500.
fn internal(detail: &str) -> (StatusCode, &'static str, String) {
    tracing::error!(error = %detail, "Internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        INTERNAL_MESSAGE.to_string(),
    )
}

/// Classify a store error into an HTTP status, error code, and message.
///
/// Handlers that expect a conflict (duplicate username) match on it before
/// it gets here, so any store error reaching this point is a 500. Constraint
/// names and driver messages stay in the log.
fn classify_store_error(err: &StoreError) -> (StatusCode, &'static str, String) {
    match err {
        StoreError::Conflict(constraint) => {
            internal(&format!("Unhandled unique constraint violation: {constraint}"))
        }
        StoreError::Database(db_err) => internal(&db_err.to_string()),
    }
}
