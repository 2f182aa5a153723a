//! Authentication primitives.
//!
//! - [`jwt`] -- access credential issuance and verification ([`jwt::TokenIssuer`]).
//! - [`session`] -- session creation, rotation and revocation ([`session::SessionManager`]).
//! - [`cookie`] -- the cookie policy for session tokens.
//! - [`password`] -- Argon2id password hashing and verification.

pub mod cookie;
pub mod jwt;
pub mod password;
pub mod session;
