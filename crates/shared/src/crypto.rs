//! Cryptographic utilities for API key hashing.

use sha2::{Digest, Sha256};

/// Prefix every issued report API key starts with.
pub const API_KEY_PREFIX: &str = "cr_";

/// Computes SHA-256 hash of the input and returns it as a hex string.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Extracts the prefix from an API key (first 8 characters after "cr_").
pub fn extract_key_prefix(key: &str) -> Option<&str> {
    if key.starts_with(API_KEY_PREFIX) {
        key.get(3..11)
    } else {
        None
    }
}

/// Returns true if the key has the expected shape (prefix plus at least 8 chars).
pub fn is_well_formed_key(key: &str) -> bool {
    extract_key_prefix(key).is_some()
}
