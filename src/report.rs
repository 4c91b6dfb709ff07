//! Mining report formatting
//!
//! Renders the outcome of a successful search as a human-readable summary
//! plus a ready-to-paste chain-parameters snippet embedding the mined
//! values as literals. Pure presentation; the only contract is literal
//! value correctness.

use crate::config::GenesisParams;
use crate::miner::MiningResult;
use crate::utils::{format_duration, format_hash_rate};
use crate::BlockHash;
use chrono::DateTime;
use std::fmt;

/// Subunits per whole coin
const COIN: u64 = 100_000_000;

/// A successful mining run ready for rendering
pub struct MiningReport<'a> {
    params: &'a GenesisParams,
    merkle_root: BlockHash,
    result: &'a MiningResult,
}

impl<'a> MiningReport<'a> {
    /// Create a report
    pub fn new(params: &'a GenesisParams, merkle_root: BlockHash, result: &'a MiningResult) -> Self {
        Self {
            params,
            merkle_root,
            result,
        }
    }

    /// The chain-parameters snippet embedding the mined values
    ///
    /// The block hash is rendered in display order; the merkle root in
    /// internal byte order, which is how the downstream consensus module
    /// stores it.
    pub fn chainparams_snippet(&self) -> String {
        format!(
            "genesis = CreateGenesisBlock({}, {}, 0x{:08x}, {}, {});\n\
             assert(consensus.hashGenesisBlock == uint256{{\"{}\"}});\n\
             assert(genesis.hashMerkleRoot == uint256{{\"{}\"}});",
            self.params.timestamp,
            self.result.nonce,
            self.params.bits,
            self.params.version,
            reward_literal(self.params.reward_subunits),
            self.result.hash,
            self.merkle_root.to_hex_internal(),
        )
    }

    fn timestamp_utc(&self) -> String {
        DateTime::from_timestamp(i64::from(self.params.timestamp), 0)
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "invalid timestamp".to_string())
    }
}

impl fmt::Display for MiningReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rate = self.result.hashes as f64 / self.result.elapsed.as_secs_f64().max(f64::EPSILON);

        writeln!(f, "=== GENESIS BLOCK FOUND ===")?;
        writeln!(
            f,
            "Timestamp:   {} ({})",
            self.params.timestamp,
            self.timestamp_utc()
        )?;
        writeln!(f, "Target bits: 0x{:08x}", self.params.bits)?;
        writeln!(f, "Nonce:       {}", self.result.nonce)?;
        writeln!(f, "Block hash:  {}", self.result.hash)?;
        writeln!(f, "Merkle root: {}", self.merkle_root.to_hex_internal())?;
        writeln!(
            f,
            "Search:      {} hashes in {} ({})",
            self.result.hashes,
            format_duration(self.result.elapsed.as_secs()),
            format_hash_rate(rate)
        )?;
        writeln!(f)?;
        writeln!(f, "Update your chain parameters with these values:")?;
        write!(f, "{}", self.chainparams_snippet())
    }
}

/// Render the reward as a chain-parameters literal
///
/// Whole-coin multiples use the conventional `NLL * COIN` form, anything
/// else falls back to the raw subunit count.
fn reward_literal(reward_subunits: u64) -> String {
    if reward_subunits > 0 && reward_subunits % COIN == 0 {
        format!("{}LL * COIN", reward_subunits / COIN)
    } else {
        format!("{reward_subunits}")
    }
}
