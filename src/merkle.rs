//! Merkle root computation
//!
//! Reduces an ordered sequence of transaction ids to a single root hash.
//! Genesis blocks only ever carry the coinbase transaction, but the full
//! reduction is implemented so the codec generalizes to multi-transaction
//! blocks.

use crate::crypto::hash256;
use crate::BlockHash;

/// Compute the merkle root over a sequence of transaction ids
///
/// - Empty input yields the all-zero hash.
/// - A single id is the root unchanged.
/// - Otherwise adjacent pairs are combined with `hash256(left || right)`
///   level by level. An odd element at any level is paired with itself
///   (the standard duplicate-last rule).
pub fn compute_root(hashes: &[BlockHash]) -> BlockHash {
    match hashes {
        [] => BlockHash::zero(),
        [single] => *single,
        _ => {
            let mut level: Vec<BlockHash> = hashes.to_vec();
            while level.len() > 1 {
                level = level
                    .chunks(2)
                    .map(|pair| {
                        let left = pair[0];
                        let right = *pair.get(1).unwrap_or(&left);
                        combine(&left, &right)
                    })
                    .collect();
            }
            level[0]
        }
    }
}

/// Combine two nodes into their parent hash
fn combine(left: &BlockHash, right: &BlockHash) -> BlockHash {
    let mut data = [0u8; 64];
    data[..32].copy_from_slice(left.as_bytes());
    data[32..].copy_from_slice(right.as_bytes());
    BlockHash::new(hash256(&data))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(byte: u8) -> BlockHash {
        BlockHash::new([byte; 32])
    }

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(compute_root(&[]), BlockHash::zero());
    }

    #[test]
    fn test_single_is_identity() {
        let only = leaf(0x42);
        assert_eq!(compute_root(&[only]), only);
    }

    #[test]
    fn test_pair_combines_once() {
        let (a, b) = (leaf(1), leaf(2));
        assert_eq!(compute_root(&[a, b]), combine(&a, &b));
    }

    #[test]
    fn test_odd_count_duplicates_last() {
        let (a, b, c) = (leaf(1), leaf(2), leaf(3));
        let expected = combine(&combine(&a, &b), &combine(&c, &c));
        assert_eq!(compute_root(&[a, b, c]), expected);
    }

    #[test]
    fn test_order_matters() {
        let (a, b) = (leaf(1), leaf(2));
        assert_ne!(compute_root(&[a, b]), compute_root(&[b, a]));
    }

    #[test]
    fn test_four_leaves() {
        let leaves = [leaf(1), leaf(2), leaf(3), leaf(4)];
        let expected = combine(
            &combine(&leaves[0], &leaves[1]),
            &combine(&leaves[2], &leaves[3]),
        );
        assert_eq!(compute_root(&leaves), expected);
    }
}
