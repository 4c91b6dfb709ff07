//! End-to-end genesis mining scenarios
//!
//! Exercises the full pipeline with the Vertocoin mainnet parameters:
//! coinbase construction, merkle root, header mining at a low difficulty,
//! and independent verification of the result.

use genesis_miner::config::{GenesisParams, ParamOverrides};
use genesis_miner::miner::{Search, SearchOutcome};
use genesis_miner::transaction::CoinbaseTransaction;
use genesis_miner::verifier;
use genesis_miner::worker::{CpuWorker, MiningWorker};
use genesis_miner::{merkle, BlockHash, Error, Nonce};
use tokio_util::sync::CancellationToken;

const PUBLISHED_MERKLE_ROOT: &str =
    "e9cdd17d0935491ae1bfa045800e17381f987f96991d40febf7b5cb7e293fba2";

#[test]
fn vertocoin_genesis_mines_and_verifies() {
    // Default parameters are the Vertocoin values: version 1, zero previous
    // hash, timestamp 1719792000, bits 0x207fffff, reward 2e9 coins
    let params = GenesisParams::default();
    params.validate().unwrap();

    let coinbase = CoinbaseTransaction::build(&params.coinbase_params().unwrap()).unwrap();
    let txid = coinbase.txid();

    // With exactly one transaction the merkle root is the txid, and it must
    // match the published chain parameters
    let merkle_root = merkle::compute_root(&[txid]);
    assert_eq!(merkle_root, txid);
    assert_eq!(merkle_root.to_hex_internal(), PUBLISHED_MERKLE_ROOT);

    let template = params.header_template(merkle_root).unwrap();
    let target = params.target().unwrap();

    // 0x207fffff is a very easy target: the search from nonce 0 terminates
    let result = match Search::new(&template, target, Nonce::new(0)).run() {
        SearchOutcome::Found(result) => result,
        SearchOutcome::Exhausted { .. } => panic!("easy target must terminate with a solution"),
    };

    // The found hash satisfies the target under the documented convention
    assert!(target.meets(result.hash.as_bytes()));

    // Independent verification reports both conditions true
    let mined = template.with_nonce(result.nonce);
    let verification = verifier::verify(&mined, &result.hash, target);
    assert!(verification.hash_matches);
    assert!(verification.meets_target);
    assert!(verification.is_valid());
}

#[test]
fn mutating_any_header_byte_breaks_hash_equality() {
    let params = GenesisParams::default();
    let coinbase = CoinbaseTransaction::build(&params.coinbase_params().unwrap()).unwrap();
    let merkle_root = merkle::compute_root(&[coinbase.txid()]);
    let template = params.header_template(merkle_root).unwrap();
    let target = params.target().unwrap();

    let result = match Search::new(&template, target, Nonce::new(0)).run() {
        SearchOutcome::Found(result) => result,
        SearchOutcome::Exhausted { .. } => panic!("easy target must terminate with a solution"),
    };
    let mined = template.with_nonce(result.nonce);

    // Flip one byte at every position of the serialized header in turn
    let bytes = mined.to_bytes();
    for position in 0..bytes.len() {
        let mut corrupted = bytes;
        corrupted[position] ^= 0x01;
        let header = genesis_miner::BlockHeader::from_bytes(&corrupted).unwrap();
        let verification = verifier::verify(&header, &result.hash, target);
        assert!(
            !verification.hash_matches,
            "byte {position} flip went undetected"
        );
    }
}

#[test]
fn published_vertocoin_parameters_verify() {
    // The fixture recorded in the chain parameters file: harder bits and
    // the nonce found for them
    let mut params = GenesisParams::default();
    params.bits = 0x1f00ffff;

    let merkle_root = BlockHash::from_hex_internal(PUBLISHED_MERKLE_ROOT).unwrap();
    let header = params
        .header_template(merkle_root)
        .unwrap()
        .with_nonce(Nonce::new(118636));

    let claimed =
        BlockHash::from_hex("000092d308e918a0036a633b2c931ad9112b0c83f341b0cbc3fecbcddbbd503e")
            .unwrap();

    let verification = verifier::verify(&header, &claimed, params.target().unwrap());
    assert!(verification.is_valid());
}

#[tokio::test]
async fn parallel_worker_agrees_with_verifier() {
    let params = GenesisParams::default();
    let coinbase = CoinbaseTransaction::build(&params.coinbase_params().unwrap()).unwrap();
    let merkle_root = merkle::compute_root(&[coinbase.txid()]);
    let template = params.header_template(merkle_root).unwrap();
    let target = params.target().unwrap();

    let mut worker = CpuWorker::new(4);
    let result = worker
        .mine(
            template,
            target,
            Nonce::new(0),
            CancellationToken::new(),
            None,
        )
        .await
        .unwrap();

    let mined = template.with_nonce(result.nonce);
    assert!(verifier::verify(&mined, &result.hash, target).is_valid());
}

#[tokio::test]
async fn overrides_flow_into_the_built_block() {
    let overrides = ParamOverrides {
        message: Some("integration override".to_string()),
        timestamp: Some(1296688602),
        ..Default::default()
    };
    let params = GenesisParams::load(None, &overrides).await.unwrap();

    let coinbase = CoinbaseTransaction::build(&params.coinbase_params().unwrap()).unwrap();
    // A different message yields a different merkle root
    assert_ne!(
        merkle::compute_root(&[coinbase.txid()]).to_hex_internal(),
        PUBLISHED_MERKLE_ROOT
    );

    let template = params
        .header_template(merkle::compute_root(&[coinbase.txid()]))
        .unwrap();
    assert_eq!(template.timestamp, 1296688602);
}

#[test]
fn exhaustion_is_reported_not_swallowed() {
    let params = GenesisParams::default();
    let merkle_root = BlockHash::from_hex_internal(PUBLISHED_MERKLE_ROOT).unwrap();
    let template = params.header_template(merkle_root).unwrap();

    // Zero target over a small tail range cannot be satisfied
    let search = Search::bounded(
        &template,
        genesis_miner::Target::zero(),
        Nonce::new(u32::MAX - 50),
        Nonce::new(u32::MAX),
    );
    match search.run() {
        SearchOutcome::Exhausted { hashes } => assert_eq!(hashes, 51),
        SearchOutcome::Found(_) => panic!("zero target cannot be met"),
    }

    let err = Error::Exhausted { hashes: 51 };
    assert!(err.is_outcome());
    assert!(err.to_string().contains("exhausted"));
}
