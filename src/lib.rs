//! Genesis Miner
//!
//! Constructs, mines, and verifies a proof-of-work genesis block for a
//! Bitcoin-style chain:
//! - Coinbase transaction serialization and merkle root computation
//! - 80-byte block header codec with double-SHA-256 hashing
//! - Compact ("bits") target decoding and strict hash-below-target checks
//! - Restartable nonce search, single-threaded or sharded across CPU threads
//! - Independent verification of published genesis parameters

pub mod config;
pub mod crypto;
pub mod error;
pub mod header;
pub mod merkle;
pub mod miner;
pub mod report;
pub mod transaction;
pub mod types;
pub mod utils;
pub mod verifier;
pub mod worker;

pub use config::GenesisParams;
pub use error::{Error, Result};
pub use header::BlockHeader;
pub use types::{BlockHash, Nonce, Target};

/// Application information
pub const APP_NAME: &str = "genesis-miner";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
