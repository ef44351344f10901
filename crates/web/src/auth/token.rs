//! Opaque token generation and hashing.
//!
//! Session cookies and password-reset links carry opaque random tokens;
//! only the SHA-256 hex digest is stored server-side so a database leak
//! does not compromise live sessions or pending resets. Comparisons happen
//! on digests, which also sidesteps timing leaks on the raw values.

use rand::distributions::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Length of generated tokens in characters.
pub const TOKEN_LENGTH: usize = 64;

/// Generate a cryptographically random alphanumeric token.
pub fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Compute the SHA-256 hex digest of a token.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Digest-based equality for user-supplied token echoes (CSRF).
pub fn tokens_match(expected: &str, submitted: &str) -> bool {
    hash_token(expected) == hash_token(submitted)
}
