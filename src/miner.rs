//! Nonce search state machine
//!
//! Drives the proof-of-work search as an explicit state machine: each step
//! serializes the header with the candidate nonce, double-hashes it, and
//! compares against the target. The search is deterministic, restartable
//! from any starting nonce, and boundable to a sub-range so parallel workers
//! can shard the space.

use crate::crypto::Sha256dHasher;
use crate::header::{BlockHeader, HEADER_SIZE};
use crate::{BlockHash, Nonce, Target};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::debug;

/// Byte offset of the nonce within the serialized header
const NONCE_OFFSET: usize = HEADER_SIZE - 4;

/// Progress is reported every this many attempts
pub const PROGRESS_INTERVAL: u64 = 100_000;

/// State of an in-flight nonce search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    /// Trying this nonce next
    Searching(Nonce),
    /// A nonce satisfying the target was found
    Found { nonce: Nonce, hash: BlockHash },
    /// The search range was exhausted without success
    Exhausted,
}

/// Successful mining outcome
#[derive(Debug, Clone, Serialize)]
pub struct MiningResult {
    /// The satisfying nonce
    pub nonce: Nonce,
    /// The header hash it produced
    pub hash: BlockHash,
    /// Wall time spent searching
    #[serde(skip)]
    pub elapsed: Duration,
    /// Number of header hashes computed
    pub hashes: u64,
}

/// Terminal outcome of a completed search
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    /// A satisfying nonce was found
    Found(MiningResult),
    /// The range was exhausted; exhaustion is a reportable outcome, not a
    /// defect
    Exhausted { hashes: u64 },
}

/// A bounded, restartable nonce search over one header template
pub struct Search {
    bytes: [u8; HEADER_SIZE],
    target: Target,
    end: Nonce,
    state: SearchState,
    hasher: Sha256dHasher,
    hashes: u64,
    started: Instant,
}

impl Search {
    /// Search from `start` to the end of the 32-bit nonce space
    pub fn new(template: &BlockHeader, target: Target, start: Nonce) -> Self {
        Self::bounded(template, target, start, Nonce::new(u32::MAX))
    }

    /// Search the inclusive range `start..=end`
    ///
    /// Parallel workers each take a disjoint range; the template's own nonce
    /// field is ignored.
    pub fn bounded(template: &BlockHeader, target: Target, start: Nonce, end: Nonce) -> Self {
        let state = if start <= end {
            SearchState::Searching(start)
        } else {
            SearchState::Exhausted
        };

        Self {
            bytes: template.to_bytes(),
            target,
            end,
            state,
            hasher: Sha256dHasher::new(),
            hashes: 0,
            started: Instant::now(),
        }
    }

    /// Current state
    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Number of hashes computed so far
    pub fn hashes(&self) -> u64 {
        self.hashes
    }

    /// Attempt the current nonce and advance
    ///
    /// A no-op in the `Found` and `Exhausted` states.
    pub fn step(&mut self) -> &SearchState {
        if let SearchState::Searching(nonce) = self.state {
            self.bytes[NONCE_OFFSET..].copy_from_slice(&nonce.to_bytes());
            let (meets, hash) = self.hasher.hash_and_check(&self.bytes, &self.target);
            self.hashes += 1;

            self.state = if meets {
                SearchState::Found {
                    nonce,
                    hash: BlockHash::new(hash),
                }
            } else if nonce == self.end {
                SearchState::Exhausted
            } else {
                match nonce.checked_increment() {
                    Some(next) => SearchState::Searching(next),
                    None => SearchState::Exhausted,
                }
            };
        }
        &self.state
    }

    /// Run a bounded number of steps, stopping early on a terminal state
    pub fn step_batch(&mut self, count: u64) -> &SearchState {
        for _ in 0..count {
            if !matches!(self.step(), SearchState::Searching(_)) {
                break;
            }
        }
        &self.state
    }

    /// Drive the search to completion
    ///
    /// Progress is emitted through tracing at a fixed attempt interval and
    /// never alters the search state.
    pub fn run(mut self) -> SearchOutcome {
        loop {
            match *self.step() {
                SearchState::Searching(nonce) => {
                    if self.hashes % PROGRESS_INTERVAL == 0 {
                        let elapsed = self.started.elapsed().as_secs_f64();
                        debug!(
                            tried = self.hashes,
                            next_nonce = nonce.value(),
                            rate_hps = self.hashes as f64 / elapsed.max(f64::EPSILON),
                            "search progress"
                        );
                    }
                }
                SearchState::Found { nonce, hash } => {
                    return SearchOutcome::Found(MiningResult {
                        nonce,
                        hash,
                        elapsed: self.started.elapsed(),
                        hashes: self.hashes,
                    });
                }
                SearchState::Exhausted => {
                    return SearchOutcome::Exhausted {
                        hashes: self.hashes,
                    };
                }
            }
        }
    }

    /// Consume the search and report the result found so far, if any
    pub fn into_outcome(self) -> SearchOutcome {
        match self.state {
            SearchState::Found { nonce, hash } => SearchOutcome::Found(MiningResult {
                nonce,
                hash,
                elapsed: self.started.elapsed(),
                hashes: self.hashes,
            }),
            _ => SearchOutcome::Exhausted {
                hashes: self.hashes,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BlockHash;

    fn template(bits: u32) -> BlockHeader {
        BlockHeader {
            version: 1,
            prev_hash: BlockHash::zero(),
            merkle_root: BlockHash::new([0x11; 32]),
            timestamp: 1719792000,
            bits,
            nonce: Nonce::new(0),
        }
    }

    #[test]
    fn test_easy_target_terminates_with_valid_proof() {
        let header = template(0x207fffff);
        let target = Target::from_compact(header.bits).unwrap();

        match Search::new(&header, target, Nonce::new(0)).run() {
            SearchOutcome::Found(result) => {
                // The found hash must satisfy the target and match an
                // independent recomputation
                assert!(target.meets(result.hash.as_bytes()));
                let mined = header.with_nonce(result.nonce);
                assert_eq!(mined.hash(), result.hash);
                assert!(result.hashes > 0);
            }
            SearchOutcome::Exhausted { .. } => panic!("easy target must be minable"),
        }
    }

    #[test]
    fn test_bounded_range_exhausts() {
        let header = template(0x207fffff);
        // Unsatisfiable target forces exhaustion of the bounded range
        let search = Search::bounded(&header, Target::zero(), Nonce::new(0), Nonce::new(99));
        match search.run() {
            SearchOutcome::Exhausted { hashes } => assert_eq!(hashes, 100),
            SearchOutcome::Found(_) => panic!("zero target cannot be met"),
        }
    }

    #[test]
    fn test_empty_range_starts_exhausted() {
        let header = template(0x207fffff);
        let target = Target::from_compact(header.bits).unwrap();
        let search = Search::bounded(&header, target, Nonce::new(10), Nonce::new(9));
        assert_eq!(*search.state(), SearchState::Exhausted);
    }

    #[test]
    fn test_restartable_from_any_nonce() {
        let header = template(0x207fffff);
        let target = Target::from_compact(header.bits).unwrap();

        let first = match Search::new(&header, target, Nonce::new(0)).run() {
            SearchOutcome::Found(result) => result,
            SearchOutcome::Exhausted { .. } => panic!("easy target must be minable"),
        };

        // Restarting at the winning nonce finds it on the first attempt
        match Search::new(&header, target, first.nonce).run() {
            SearchOutcome::Found(result) => {
                assert_eq!(result.nonce, first.nonce);
                assert_eq!(result.hash, first.hash);
                assert_eq!(result.hashes, 1);
            }
            SearchOutcome::Exhausted { .. } => panic!("known nonce must be found"),
        }
    }

    #[test]
    fn test_step_is_noop_after_terminal_state() {
        let header = template(0x207fffff);
        let mut search = Search::bounded(&header, Target::zero(), Nonce::new(0), Nonce::new(0));
        assert_eq!(*search.step(), SearchState::Exhausted);
        assert_eq!(*search.step(), SearchState::Exhausted);
        assert_eq!(search.hashes(), 1);
    }

    #[test]
    fn test_step_batch_stops_at_terminal() {
        let header = template(0x207fffff);
        let mut search = Search::bounded(&header, Target::zero(), Nonce::new(0), Nonce::new(4));
        search.step_batch(1_000);
        assert_eq!(*search.state(), SearchState::Exhausted);
        assert_eq!(search.hashes(), 5);
    }
}
