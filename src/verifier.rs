//! Genesis verification
//!
//! Recomputes a header hash from stored parameters and checks it against
//! both the claimed hash and the target. The two checks are reported
//! independently so a caller can tell corruption (hash mismatch) apart from
//! insufficient work (target not met).

use crate::{BlockHash, BlockHeader, Error, Result, Target};
use serde::Serialize;

/// Outcome of verifying a header against a claimed hash and target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Verification {
    /// Recomputed hash equals the claimed hash
    pub hash_matches: bool,
    /// Recomputed hash satisfies the target
    pub meets_target: bool,
    /// The recomputed hash
    pub computed_hash: BlockHash,
}

impl Verification {
    /// Both conditions hold
    pub fn is_valid(&self) -> bool {
        self.hash_matches && self.meets_target
    }

    /// Convert into a `Result`, reporting which condition failed
    pub fn into_result(self) -> Result<BlockHash> {
        if self.is_valid() {
            Ok(self.computed_hash)
        } else {
            Err(Error::Verification {
                hash_matches: self.hash_matches,
                meets_target: self.meets_target,
            })
        }
    }
}

/// Verify a header against a claimed hash and its decoded target
pub fn verify(header: &BlockHeader, claimed_hash: &BlockHash, target: Target) -> Verification {
    let computed_hash = header.hash();
    Verification {
        hash_matches: computed_hash == *claimed_hash,
        meets_target: target.meets(computed_hash.as_bytes()),
        computed_hash,
    }
}
