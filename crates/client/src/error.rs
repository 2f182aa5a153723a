use reqwest::{Response, StatusCode};

use crate::models::ErrorReply;
use crate::protocol::InvalidTransition;

/// Maximum length of a non-JSON error body kept in [`ClientError::Api`].
const MAX_ERROR_BODY_LENGTH: usize = 500;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server returned {status}: {message}")]
    Api {
        status: StatusCode,
        code: Option<String>,
        message: String,
    },

    /// The session could not be refreshed; local credentials were discarded.
    #[error("session ended, sign in again")]
    SessionEnded,

    /// The refresh exchange did not finish in time; local credentials were discarded.
    #[error("session refresh timed out")]
    RefreshTimedOut,

    #[error(transparent)]
    Protocol(#[from] InvalidTransition),
}

impl ClientError {
    /// Build an [`ClientError::Api`] from a failed response, reading its
    /// `{error, code}` body when present.
    pub(crate) async fn from_response(response: Response) -> Self {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        match serde_json::from_str::<ErrorReply>(&body) {
            Ok(reply) => ClientError::Api {
                status,
                code: Some(reply.code),
                message: reply.error,
            },
            Err(_) => ClientError::Api {
                status,
                code: None,
                message: truncate(&body),
            },
        }
    }

    /// HTTP status for [`ClientError::Api`], `None` otherwise.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Machine-readable server error code for [`ClientError::Api`].
    pub fn code(&self) -> Option<&str> {
        match self {
            ClientError::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

/// Pass successful responses through, turn the rest into [`ClientError::Api`].
pub(crate) async fn ensure_success(response: Response) -> Result<Response, ClientError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(ClientError::from_response(response).await)
    }
}

fn truncate(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY_LENGTH;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
}
