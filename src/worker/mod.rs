//! Mining worker implementations
//!
//! Workers search the nonce space for a header hash below the target. The
//! baseline search is the sequential state machine in [`crate::miner`];
//! workers layer sharding, cancellation, and progress reporting on top of it
//! without touching the search semantics.

use crate::miner::MiningResult;
use crate::{BlockHeader, Nonce, Result, Target};
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::Span;

pub mod cpu;

pub use cpu::CpuWorker;

/// Mining statistics for a worker
#[derive(Debug, Clone, Default)]
pub struct MiningStats {
    /// Total hashes computed
    pub total_hashes: u64,
    /// Time spent mining (seconds)
    pub mining_time_secs: u64,
    /// Average hash rate (hashes per second)
    pub average_hash_rate: f64,
}

/// Mining worker trait
///
/// A worker explores the nonce space from `start` to the end of the 32-bit
/// range. It must respect the cancellation token, partition (never
/// duplicate) nonce ranges internally, and report exhaustion of the space
/// as an error rather than a sentinel.
#[async_trait]
pub trait MiningWorker: Send + Sync {
    /// Get the worker type name for logging
    fn worker_type(&self) -> &'static str;

    /// Search for a nonce satisfying the target
    async fn mine(
        &mut self,
        template: BlockHeader,
        target: Target,
        start: Nonce,
        cancellation: CancellationToken,
        stats_tx: Option<mpsc::UnboundedSender<MiningStats>>,
    ) -> Result<MiningResult>;

    /// Get current mining statistics
    fn stats(&self) -> MiningStats {
        MiningStats::default()
    }
}

/// Utility function to compute hash rate over a time period
pub fn compute_hash_rate(hashes: u64, elapsed: Duration) -> f64 {
    if elapsed.as_secs_f64() > 0.0 {
        hashes as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    }
}

/// Create a tracing span for mining operations
pub fn mining_span(worker_type: &str, start: Nonce) -> Span {
    tracing::info_span!(
        "mining",
        worker_type = worker_type,
        start_nonce = start.value(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_hash_rate() {
        assert_eq!(compute_hash_rate(1000, Duration::from_secs(10)), 100.0);
        assert_eq!(compute_hash_rate(0, Duration::from_secs(10)), 0.0);
        assert_eq!(compute_hash_rate(1000, Duration::from_secs(0)), 0.0);
    }
}
