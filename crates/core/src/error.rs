use crate::types::DbId;

/// Message returned for every failed sign-in, whatever the cause.
pub const BAD_CREDENTIALS_MESSAGE: &str = "Invalid username or password";

/// Domain errors shared by every crate in the workspace.
///
/// The HTTP layer is the only place these are turned into status codes.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Sign-in failed. Unknown user and wrong password are the same variant
    /// so callers cannot tell them apart.
    #[error("Invalid username or password")]
    BadCredentials,

    /// A credential (bearer token or session cookie) was not presented at all.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}
