//! Genesis Miner - Main Application
//!
//! Mines a genesis block from configured parameters or verifies published
//! genesis parameters against a claimed block hash.

use genesis_miner::{
    config::{Cli, Command, GenesisParams, MineArgs, VerifyArgs},
    merkle,
    miner::{Search, SearchOutcome},
    report::MiningReport,
    transaction::CoinbaseTransaction,
    utils::format_hash_rate,
    verifier,
    worker::{CpuWorker, MiningStats, MiningWorker},
    BlockHash, Error, Nonce, Result, APP_NAME, APP_VERSION,
};

use clap::Parser;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(tracing::Level::from(cli.log_level).to_string().to_lowercase())
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    info!("{} v{}", APP_NAME, APP_VERSION);

    let outcome = match cli.command {
        Command::Mine(args) => run_mine(cli.config_file, args).await,
        Command::Verify(args) => run_verify(cli.config_file, args).await,
    };

    if let Err(e) = outcome {
        if e.is_outcome() {
            // Exhaustion and verification mismatches are reportable results
            error!("{}", e);
        } else {
            error!(category = e.category(), "{}", e);
        }
        std::process::exit(1);
    }
}

/// Build the coinbase and header, mine, verify, and print the report
async fn run_mine(config_file: Option<PathBuf>, args: MineArgs) -> Result<()> {
    let params = GenesisParams::load(config_file.as_ref(), &args.overrides).await?;
    let target = params.target()?;

    let coinbase = CoinbaseTransaction::build(&params.coinbase_params()?)?;
    let merkle_root = merkle::compute_root(&[coinbase.txid()]);
    let template = params.header_template(merkle_root)?;

    info!(
        timestamp = params.timestamp,
        bits = %format!("0x{:08x}", params.bits),
        merkle_root = %merkle_root.to_hex_internal(),
        start_nonce = params.start_nonce,
        "mining genesis block"
    );

    let start = Nonce::new(params.start_nonce);
    let result = if args.sequential {
        match Search::new(&template, target, start).run() {
            SearchOutcome::Found(result) => result,
            SearchOutcome::Exhausted { hashes } => return Err(Error::Exhausted { hashes }),
        }
    } else {
        let mut worker = CpuWorker::new(args.threads);

        let (stats_tx, mut stats_rx) = mpsc::unbounded_channel::<MiningStats>();
        let stats_handle = tokio::spawn(async move {
            while let Some(stats) = stats_rx.recv().await {
                debug!(
                    hashes = stats.total_hashes,
                    rate = %format_hash_rate(stats.average_hash_rate),
                    "mining progress"
                );
            }
        });

        let result = worker
            .mine(template, target, start, CancellationToken::new(), Some(stats_tx))
            .await;
        stats_handle.abort();
        result?
    };

    // Re-verify independently before publishing anything
    let mined = template.with_nonce(result.nonce);
    verifier::verify(&mined, &result.hash, target).into_result()?;
    info!(nonce = result.nonce.value(), "solution verified");

    println!("{}", MiningReport::new(&params, merkle_root, &result));
    Ok(())
}

/// Recompute a header hash from stored parameters and check both conditions
async fn run_verify(config_file: Option<PathBuf>, args: VerifyArgs) -> Result<()> {
    let params = GenesisParams::load(config_file.as_ref(), &args.overrides).await?;
    let target = params.target()?;

    let merkle_root = match &args.merkle_root {
        Some(hex) => BlockHash::from_hex_internal(hex)?,
        None => {
            let coinbase = CoinbaseTransaction::build(&params.coinbase_params()?)?;
            merkle::compute_root(&[coinbase.txid()])
        }
    };

    let header = params.header_template(merkle_root)?.with_nonce(Nonce::new(args.nonce));
    let claimed = BlockHash::from_hex(&args.hash)?;

    let verification = verifier::verify(&header, &claimed, target);

    println!("Claimed hash:    {claimed}");
    println!("Computed hash:   {}", verification.computed_hash);
    println!("Target:          {target}");
    println!(
        "Hash matches:    {}",
        if verification.hash_matches { "yes" } else { "NO" }
    );
    println!(
        "Meets target:    {}",
        if verification.meets_target { "yes" } else { "NO" }
    );

    verification.into_result().map(|_| {
        println!("Genesis parameters are valid.");
    })
}
