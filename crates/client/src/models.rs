//! Wire types exchanged with the server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The signed-in user as the server reports it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /auth/signup`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUp {
    pub username: String,
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct SignInBody<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignInReply {
    pub access_token: String,
    pub user: UserProfile,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AccessTokenReply {
    pub access_token: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MeReply {
    pub user: UserProfile,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorReply {
    pub error: String,
    pub code: String,
}
