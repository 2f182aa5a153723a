//! Client side of the tessera session protocol.
//!
//! [`AuthClient`] holds the access credential in memory and the session
//! token in a private cookie slot, attaches the former to every protected
//! call, and on a 403 drives one refresh cycle before replaying the call.

pub mod client;
pub mod config;
mod credentials;
pub mod error;
pub mod models;
pub mod protocol;

pub use client::{AuthClient, OutboundCall};
pub use config::ClientConfig;
pub use error::ClientError;
pub use models::{SignUp, UserProfile};
pub use protocol::{AuthEvent, AuthState, RetryBudget};
