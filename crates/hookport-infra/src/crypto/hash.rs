//! SHA-256 digests of API keys.
//!
//! Plaintext keys are shown once at creation; only the lowercase hex digest
//! is stored and compared.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 digest of an API key (lowercase hex).
pub fn hash_api_key(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    format!("{:x}", digest)
}
