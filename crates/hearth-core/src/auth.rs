//! Credential primitives for console authentication
//!
//! The console stores only a hashed credential. The plaintext entered at
//! the password prompt is hashed and compared in constant time, so a
//! mismatch reveals nothing about the stored value.

use sha2::{Digest, Sha512};

/// Length of a SHA-512 digest, hex encoded
const HASH_HEX_LEN: usize = 128;

/// Check whether a string has the shape of a stored credential hash
/// (128 hex characters, i.e. a SHA-512 digest)
pub fn is_hash(value: &str) -> bool {
    value.len() == HASH_HEX_LEN && value.chars().all(|c| c.is_ascii_hexdigit())
}

/// Hash a plaintext credential the way the host stores it
pub fn hash_password(plaintext: &str) -> String {
    let digest = Sha512::digest(plaintext.as_bytes());
    hex::encode(digest)
}

/// One-way compare of a plaintext credential against a stored hash
///
/// Uses constant-time comparison to prevent timing attacks.
pub fn check_hashed_password(plaintext: &str, hashed: &str) -> bool {
    let computed = hash_password(plaintext);
    if computed.len() != hashed.len() {
        return false;
    }

    let mut result = 0u8;
    for (a, b) in computed.bytes().zip(hashed.bytes()) {
        result |= a ^ b;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_valid_hash() {
        let hashed = hash_password("very secret");
        assert_eq!(hashed.len(), HASH_HEX_LEN);
        assert!(is_hash(&hashed));
    }

    #[test]
    fn test_is_hash_rejects_wrong_shapes() {
        assert!(!is_hash(""));
        assert!(!is_hash("abc123"));
        assert!(!is_hash(&"g".repeat(HASH_HEX_LEN)));
        assert!(!is_hash(&"a".repeat(HASH_HEX_LEN - 1)));
    }

    #[test]
    fn test_check_hashed_password() {
        let hashed = hash_password("opensesame");
        assert!(check_hashed_password("opensesame", &hashed));
        assert!(!check_hashed_password("Opensesame", &hashed));
        assert!(!check_hashed_password("", &hashed));
    }

    #[test]
    fn test_check_against_non_hash() {
        // A malformed stored value can never match.
        assert!(!check_hashed_password("anything", "not-a-hash"));
    }
}
