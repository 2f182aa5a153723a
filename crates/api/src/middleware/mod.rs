//! Request extractors guarding protected routes.
//!
//! - [`auth::AuthUser`] -- resolves the caller from a Bearer access credential.

pub mod auth;
