//! CPU mining worker
//!
//! Multi-threaded nonce search: the remaining 32-bit nonce space is split
//! into disjoint contiguous ranges, one task per thread, each driving a
//! bounded sequential search in batches. The first solution wins and
//! cancels the rest; if every range exhausts without success the worker
//! reports exhaustion.

use super::{compute_hash_rate, mining_span, MiningStats, MiningWorker};
use crate::miner::{MiningResult, Search, SearchOutcome};
use crate::{BlockHeader, Error, Nonce, Result, Target};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Nonces tried between cancellation checks
const BATCH_SIZE: u64 = 100_000;

/// CPU mining worker using multiple tasks over disjoint nonce ranges
pub struct CpuWorker {
    thread_count: usize,
    stats: Arc<CpuMiningStats>,
}

/// Thread-safe mining statistics shared across search tasks
#[derive(Debug)]
struct CpuMiningStats {
    total_hashes: AtomicU64,
    started: Mutex<Instant>,
}

impl CpuMiningStats {
    fn new() -> Self {
        Self {
            total_hashes: AtomicU64::new(0),
            started: Mutex::new(Instant::now()),
        }
    }

    fn reset(&self) {
        self.total_hashes.store(0, Ordering::Relaxed);
        *self.started.lock() = Instant::now();
    }

    fn elapsed(&self) -> Duration {
        self.started.lock().elapsed()
    }

    fn to_mining_stats(&self) -> MiningStats {
        let total_hashes = self.total_hashes.load(Ordering::Relaxed);
        let elapsed = self.elapsed();

        MiningStats {
            total_hashes,
            mining_time_secs: elapsed.as_secs(),
            average_hash_rate: compute_hash_rate(total_hashes, elapsed),
        }
    }
}

impl CpuWorker {
    /// Create a new CPU worker with the given thread count (0 = all cores)
    pub fn new(thread_count: usize) -> Self {
        let thread_count = if thread_count == 0 {
            num_cpus::get()
        } else {
            thread_count
        };

        Self {
            thread_count,
            stats: Arc::new(CpuMiningStats::new()),
        }
    }

    /// Split the remaining nonce space into disjoint contiguous ranges
    ///
    /// Every nonce from `start` to `u32::MAX` appears in exactly one range.
    fn shard_ranges(start: Nonce, shards: usize) -> Vec<(Nonce, Nonce)> {
        let total = u64::from(u32::MAX) - u64::from(start.value()) + 1;
        let shards = (shards as u64).min(total);
        let chunk = total / shards;
        let remainder = total % shards;

        let mut ranges = Vec::with_capacity(shards as usize);
        let mut lo = u64::from(start.value());
        for i in 0..shards {
            let len = chunk + u64::from(i < remainder);
            let hi = lo + len - 1;
            ranges.push((Nonce::new(lo as u32), Nonce::new(hi as u32)));
            lo = hi + 1;
        }
        ranges
    }

    /// Search one nonce range, cooperating with cancellation
    async fn search_range(
        shard_id: usize,
        template: BlockHeader,
        target: Target,
        range: (Nonce, Nonce),
        stats: Arc<CpuMiningStats>,
        cancellation: CancellationToken,
        solution_tx: mpsc::UnboundedSender<MiningResult>,
    ) {
        debug!(
            shard_id,
            from = range.0.value(),
            to = range.1.value(),
            "starting search shard"
        );

        let mut search = Search::bounded(&template, target, range.0, range.1);
        let mut batches = 0u64;

        loop {
            if cancellation.is_cancelled() {
                debug!(shard_id, "shard cancelled");
                return;
            }

            let before = search.hashes();
            let searching = matches!(
                search.step_batch(BATCH_SIZE),
                crate::miner::SearchState::Searching(_)
            );
            stats
                .total_hashes
                .fetch_add(search.hashes() - before, Ordering::Relaxed);

            if !searching {
                break;
            }

            batches += 1;
            // Yield so the runtime stays responsive during long searches
            if batches % 10 == 0 {
                task::yield_now().await;
            }
        }

        match search.into_outcome() {
            SearchOutcome::Found(result) => {
                info!(shard_id, nonce = result.nonce.value(), "shard found solution");
                // Receiver may already have a winner
                let _ = solution_tx.send(result);
            }
            SearchOutcome::Exhausted { hashes } => {
                debug!(shard_id, hashes, "shard exhausted its range");
            }
        }
    }
}

#[async_trait]
impl MiningWorker for CpuWorker {
    fn worker_type(&self) -> &'static str {
        "cpu"
    }

    async fn mine(
        &mut self,
        template: BlockHeader,
        target: Target,
        start: Nonce,
        cancellation: CancellationToken,
        stats_tx: Option<mpsc::UnboundedSender<MiningStats>>,
    ) -> Result<MiningResult> {
        let _span = mining_span(self.worker_type(), start);

        info!(
            threads = self.thread_count,
            start_nonce = start.value(),
            pow_target = %target,
            "starting CPU mining"
        );

        self.stats.reset();

        if cancellation.is_cancelled() {
            return Err(Error::cancelled("CPU mining"));
        }

        let (solution_tx, mut solution_rx) = mpsc::unbounded_channel();
        // Shards run on a child token so stopping them after a win does not
        // cancel the caller's token
        let shard_cancellation = cancellation.child_token();
        let ranges = Self::shard_ranges(start, self.thread_count);

        let mut handles = Vec::with_capacity(ranges.len());
        for (shard_id, range) in ranges.into_iter().enumerate() {
            let stats = Arc::clone(&self.stats);
            let cancellation = shard_cancellation.clone();
            let solution_tx = solution_tx.clone();

            handles.push(task::spawn(Self::search_range(
                shard_id,
                template,
                target,
                range,
                stats,
                cancellation,
                solution_tx,
            )));
        }

        // Channel closes once every shard finishes
        drop(solution_tx);

        // Periodic statistics reporting
        let stats_handle = stats_tx.map(|tx| {
            let stats = Arc::clone(&self.stats);
            let stats_cancellation = shard_cancellation.clone();
            task::spawn(async move {
                let mut interval = tokio::time::interval(Duration::from_secs(5));
                loop {
                    tokio::select! {
                        _ = interval.tick() => {
                            let _ = tx.send(stats.to_mining_stats());
                        }
                        _ = stats_cancellation.cancelled() => break,
                    }
                }
            })
        });

        let result = tokio::select! {
            solution = solution_rx.recv() => {
                match solution {
                    Some(mut result) => {
                        // Report totals across all shards
                        result.hashes = self.stats.total_hashes.load(Ordering::Relaxed);
                        result.elapsed = self.stats.elapsed();
                        Ok(result)
                    }
                    None => Err(Error::Exhausted {
                        hashes: self.stats.total_hashes.load(Ordering::Relaxed),
                    }),
                }
            }
            _ = cancellation.cancelled() => Err(Error::cancelled("CPU mining")),
        };

        // Stop remaining shards and wait for them
        shard_cancellation.cancel();
        for handle in handles {
            let _ = handle.await;
        }
        if let Some(handle) = stats_handle {
            let _ = handle.await;
        }

        let final_stats = self.stats.to_mining_stats();
        info!(
            hashes = final_stats.total_hashes,
            elapsed_secs = final_stats.mining_time_secs,
            rate_hps = final_stats.average_hash_rate,
            "CPU mining completed"
        );

        result
    }

    fn stats(&self) -> MiningStats {
        self.stats.to_mining_stats()
    }
}
