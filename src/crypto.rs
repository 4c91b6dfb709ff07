//! Cryptographic utilities for mining
//!
//! Provides the double-SHA-256 primitive used for transaction ids, merkle
//! node combination, and header proof-of-work hashing.

use crate::Target;
use sha2::{Digest, Sha256};

/// Compute the double SHA-256 digest of the input
///
/// Defined as `SHA-256(SHA-256(data))`. Deterministic for any input,
/// including empty input, and always 32 bytes.
pub fn hash256(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    second.into()
}

/// Reusable double-SHA-256 hasher for hot mining loops
///
/// Avoids reallocating hasher state per nonce attempt.
pub struct Sha256dHasher {
    hasher: Sha256,
}

impl Sha256dHasher {
    /// Create a new hasher
    pub fn new() -> Self {
        Self {
            hasher: Sha256::new(),
        }
    }

    /// Hash data and return the double digest
    pub fn hash(&mut self, data: &[u8]) -> [u8; 32] {
        self.hasher.update(data);
        let first = self.hasher.finalize_reset();
        self.hasher.update(first);
        self.hasher.finalize_reset().into()
    }

    /// Hash a serialized header and check it against the target
    ///
    /// Returns whether the hash meets the target along with the hash itself.
    pub fn hash_and_check(&mut self, data: &[u8], target: &Target) -> (bool, [u8; 32]) {
        let hash = self.hash(data);
        (target.meets(&hash), hash)
    }
}

impl Default for Sha256dHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash256_deterministic() {
        let a = hash256(b"genesis");
        let b = hash256(b"genesis");
        assert_eq!(a, b);

        let c = hash256(b"genesis!");
        assert_ne!(a, c);
    }

    #[test]
    fn test_hash256_empty_input() {
        let digest = hash256(b"");
        assert_eq!(digest.len(), 32);
        // Known double-SHA-256 of the empty string
        assert_eq!(
            hex::encode(digest),
            "5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456"
        );
    }

    #[test]
    fn test_hasher_matches_free_function() {
        let mut hasher = Sha256dHasher::new();
        let data = b"block header bytes";
        assert_eq!(hasher.hash(data), hash256(data));
        // Reusable across calls
        assert_eq!(hasher.hash(data), hash256(data));
    }

    #[test]
    fn test_hash_and_check_easiest_target() {
        let mut hasher = Sha256dHasher::new();
        let target = Target::max();
        let (meets, hash) = hasher.hash_and_check(b"anything", &target);
        assert!(meets);
        assert_eq!(hash, hash256(b"anything"));
    }
}
