//! Shared building blocks for the tessera workspace.
//!
//! Nothing in here performs I/O; the `db`, `api` and `client` crates all
//! depend on it.

pub mod error;
pub mod hashing;
pub mod session_token;
pub mod types;
