//! Opaque session token generation and hashing.
//!
//! A session token is 64 bytes from the thread-local CSPRNG, hex encoded.
//! Only its SHA-256 digest is handed to storage; the plaintext lives in the
//! client's cookie and nowhere else.

use rand::RngCore;

use crate::hashing::sha256_hex;

/// Number of random bytes in a session token (512 bits of entropy).
pub const SESSION_TOKEN_BYTES: usize = 64;

/// A freshly minted session token.
pub struct GeneratedSessionToken {
    /// Sent to the client exactly once, never persisted.
    pub plaintext: String,
    /// SHA-256 hex digest of `plaintext`, used as the storage key.
    pub hash: String,
}

/// Generate a new random session token together with its storage key.
pub fn generate_session_token() -> GeneratedSessionToken {
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);

    let plaintext: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    let hash = hash_session_token(&plaintext);

    GeneratedSessionToken { plaintext, hash }
}

/// Compute the storage key for a plaintext session token.
pub fn hash_session_token(token: &str) -> String {
    sha256_hex(token.as_bytes())
}
