//! Configuration management
//!
//! Genesis parameters come from built-in defaults, an optional YAML/JSON
//! configuration file, and command line arguments, merged in that order with
//! the command line taking precedence. Everything is validated before any
//! component runs.

use crate::transaction::CoinbaseParams;
use crate::{BlockHash, BlockHeader, Error, Nonce, Result, Target};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Command line interface
#[derive(Debug, Parser)]
#[command(
    name = "genesis-miner",
    version = env!("CARGO_PKG_VERSION"),
    about = "Genesis block miner and verifier",
    long_about = "Constructs a coinbase transaction and block header for a new chain's \
                  genesis block, mines a nonce satisfying the compact target, and verifies \
                  published genesis parameters"
)]
pub struct Cli {
    /// Log level
    #[arg(short = 'l', long, default_value = "info", global = true)]
    pub log_level: LogLevel,

    /// Genesis parameter file (YAML or JSON)
    #[arg(long, value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Mine a genesis block from the configured parameters
    Mine(MineArgs),
    /// Verify stored genesis parameters against a claimed block hash
    Verify(VerifyArgs),
}

/// Arguments for the mine subcommand
#[derive(Debug, Args)]
pub struct MineArgs {
    #[command(flatten)]
    pub overrides: ParamOverrides,

    /// Number of mining threads (0 = all cores)
    #[arg(short = 'c', long, default_value = "0")]
    pub threads: usize,

    /// Force the single-threaded sequential search
    #[arg(long)]
    pub sequential: bool,
}

/// Arguments for the verify subcommand
#[derive(Debug, Args)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub overrides: ParamOverrides,

    /// Nonce stored in the published parameters
    #[arg(long)]
    pub nonce: u32,

    /// Claimed block hash (display-order hex)
    #[arg(long, value_name = "HASH")]
    pub hash: String,

    /// Stored merkle root (internal-order hex); recomputed from the
    /// coinbase parameters when omitted
    #[arg(long, value_name = "HASH")]
    pub merkle_root: Option<String>,
}

/// Command line overrides for individual genesis parameters
#[derive(Debug, Default, Args)]
pub struct ParamOverrides {
    /// Block version
    #[arg(long)]
    pub version: Option<i32>,

    /// Previous block hash (display-order hex, all zero for genesis)
    #[arg(long)]
    pub prev_hash: Option<String>,

    /// Block timestamp in Unix seconds
    #[arg(long)]
    pub timestamp: Option<u32>,

    /// Compact target, decimal or 0x-prefixed hex
    #[arg(long, value_parser = parse_bits)]
    pub bits: Option<u32>,

    /// Coinbase message
    #[arg(long)]
    pub message: Option<String>,

    /// Recipient public key (65-byte uncompressed, hex)
    #[arg(short = 'k', long)]
    pub public_key: Option<String>,

    /// Block reward in base subunits
    #[arg(long)]
    pub reward_subunits: Option<u64>,

    /// Nonce to start the search from
    #[arg(long)]
    pub start_nonce: Option<u32>,

    /// 4-byte field opening the coinbase signature script
    #[arg(long)]
    pub script_prefix: Option<u32>,

    /// Extra-nonce byte following the script prefix
    #[arg(long)]
    pub extra_nonce: Option<u8>,
}

/// Parse a compact target from decimal or 0x-prefixed hex
pub fn parse_bits(s: &str) -> std::result::Result<u32, String> {
    let parsed = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16)
    } else {
        s.parse()
    };
    parsed.map_err(|e| format!("invalid compact target {s:?}: {e}"))
}

/// Complete set of genesis parameters
///
/// These are the process-wide inputs every component receives; nothing reads
/// embedded literals. Defaults are the Vertocoin mainnet values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenesisParams {
    /// Block version
    pub version: i32,
    /// Previous block hash (display-order hex)
    pub prev_hash: String,
    /// Block timestamp in Unix seconds
    pub timestamp: u32,
    /// Compact target
    pub bits: u32,
    /// Coinbase message
    pub message: String,
    /// Recipient public key (hex, 65-byte uncompressed)
    pub public_key: String,
    /// Block reward in base subunits
    pub reward_subunits: u64,
    /// Nonce to start the search from
    pub start_nonce: u32,
    /// 4-byte field opening the coinbase signature script
    pub script_prefix: u32,
    /// Extra-nonce byte following the script prefix
    pub extra_nonce: u8,
}

impl Default for GenesisParams {
    fn default() -> Self {
        Self {
            version: 1,
            prev_hash: "0".repeat(64),
            timestamp: 1719792000,
            bits: 0x207fffff,
            message: "Vertocoin - The future of fast transactions [vertomax.com]".to_string(),
            public_key: "04678afdb0fe5548271967f1a67130b7105cd6a828e03909a67962e0ea1f61de\
                         b649f6bc3f4cef38c4f35504e51ec112de5c384df7ba0b8d578a4c702b6bf11d5f"
                .to_string(),
            reward_subunits: 2_000_000_000 * 100_000_000,
            start_nonce: 0,
            script_prefix: 486604799,
            extra_nonce: 4,
        }
    }
}

impl GenesisParams {
    /// Load parameters: defaults, then file values, then CLI overrides
    pub async fn load(config_file: Option<&PathBuf>, overrides: &ParamOverrides) -> Result<Self> {
        let mut params = match config_file {
            Some(path) => Self::load_from_file(path).await?,
            None => Self::default(),
        };
        params.apply_overrides(overrides);
        params.validate()?;
        Ok(params)
    }

    /// Load parameters from a YAML or JSON file
    async fn load_from_file(path: &PathBuf) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;

        if path.extension().and_then(|s| s.to_str()) == Some("json") {
            serde_json::from_str(&content).map_err(Error::from)
        } else {
            // Default to YAML
            serde_yaml::from_str(&content).map_err(Error::from)
        }
    }

    /// Apply command line overrides (command line takes precedence)
    fn apply_overrides(&mut self, overrides: &ParamOverrides) {
        if let Some(version) = overrides.version {
            self.version = version;
        }
        if let Some(prev_hash) = &overrides.prev_hash {
            self.prev_hash = prev_hash.clone();
        }
        if let Some(timestamp) = overrides.timestamp {
            self.timestamp = timestamp;
        }
        if let Some(bits) = overrides.bits {
            self.bits = bits;
        }
        if let Some(message) = &overrides.message {
            self.message = message.clone();
        }
        if let Some(public_key) = &overrides.public_key {
            self.public_key = public_key.clone();
        }
        if let Some(reward) = overrides.reward_subunits {
            self.reward_subunits = reward;
        }
        if let Some(start_nonce) = overrides.start_nonce {
            self.start_nonce = start_nonce;
        }
        if let Some(script_prefix) = overrides.script_prefix {
            self.script_prefix = script_prefix;
        }
        if let Some(extra_nonce) = overrides.extra_nonce {
            self.extra_nonce = extra_nonce;
        }
    }

    /// Validate all parameters
    pub fn validate(&self) -> Result<()> {
        self.previous_hash()?;
        self.target()?;

        let key = self.public_key_bytes()?;
        if key.len() != 65 {
            return Err(Error::config(format!(
                "public key must be 65 bytes (uncompressed), got {}",
                key.len()
            )));
        }
        if key[0] != 0x04 {
            return Err(Error::config(
                "public key must start with the 0x04 uncompressed marker",
            ));
        }

        if self.message.len() > u8::MAX as usize {
            return Err(Error::config(format!(
                "coinbase message is {} bytes, limit is {}",
                self.message.len(),
                u8::MAX
            )));
        }

        Ok(())
    }

    /// Previous block hash parsed from display-order hex
    pub fn previous_hash(&self) -> Result<BlockHash> {
        BlockHash::from_hex(&self.prev_hash)
            .map_err(|e| Error::config(format!("invalid previous hash: {e}")))
    }

    /// Decoded proof-of-work target
    pub fn target(&self) -> Result<Target> {
        Target::from_compact(self.bits)
    }

    /// Recipient public key bytes
    pub fn public_key_bytes(&self) -> Result<Vec<u8>> {
        hex::decode(&self.public_key)
            .map_err(|e| Error::config(format!("invalid public key hex: {e}")))
    }

    /// Coinbase builder inputs derived from these parameters
    pub fn coinbase_params(&self) -> Result<CoinbaseParams> {
        Ok(CoinbaseParams {
            script_prefix: self.script_prefix,
            extra_nonce: self.extra_nonce,
            message: self.message.clone(),
            public_key: self.public_key_bytes()?,
            reward_subunits: self.reward_subunits,
        })
    }

    /// Header template with the given merkle root and the starting nonce
    pub fn header_template(&self, merkle_root: BlockHash) -> Result<BlockHeader> {
        Ok(BlockHeader {
            version: self.version,
            prev_hash: self.previous_hash()?,
            merkle_root,
            timestamp: self.timestamp,
            bits: self.bits,
            nonce: Nonce::new(self.start_nonce),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_validate() {
        let params = GenesisParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.bits, 0x207fffff);
        assert_eq!(params.reward_subunits, 200_000_000_000_000_000);
        assert_eq!(params.public_key_bytes().unwrap().len(), 65);
    }

    #[test]
    fn test_parse_bits_forms() {
        assert_eq!(parse_bits("0x207fffff").unwrap(), 0x207fffff);
        assert_eq!(parse_bits("0X1F00FFFF").unwrap(), 0x1f00ffff);
        assert_eq!(parse_bits("486604799").unwrap(), 0x1d00ffff);
        assert!(parse_bits("0xnope").is_err());
    }

    #[test]
    fn test_cli_overrides_take_precedence() {
        let overrides = ParamOverrides {
            timestamp: Some(1296688602),
            bits: Some(0x1f00ffff),
            message: Some("another chain".to_string()),
            ..Default::default()
        };

        let mut params = GenesisParams::default();
        params.apply_overrides(&overrides);

        assert_eq!(params.timestamp, 1296688602);
        assert_eq!(params.bits, 0x1f00ffff);
        assert_eq!(params.message, "another chain");
        // Untouched fields keep their defaults
        assert_eq!(params.version, 1);
        assert_eq!(params.start_nonce, 0);
    }

    #[tokio::test]
    async fn test_load_from_yaml_file() {
        let yaml = r#"
timestamp: 1598918400
bits: 503543726
message: "fresh start"
start_nonce: 1000
"#;
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        write!(file, "{yaml}").unwrap();

        let params =
            GenesisParams::load(Some(&file.path().to_path_buf()), &ParamOverrides::default())
                .await
                .unwrap();

        assert_eq!(params.timestamp, 1598918400);
        assert_eq!(params.bits, 0x1e0377ae);
        assert_eq!(params.message, "fresh start");
        assert_eq!(params.start_nonce, 1000);
        // Defaults fill the rest
        assert_eq!(params.version, 1);
    }

    #[test]
    fn test_invalid_key_rejected() {
        let mut params = GenesisParams::default();
        params.public_key = "04ab".to_string();
        assert!(params.validate().is_err());

        params.public_key = "zz".repeat(65);
        assert!(params.validate().is_err());

        // Right length, wrong marker byte
        params.public_key = format!("05{}", "11".repeat(64));
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_overlong_message_rejected() {
        let mut params = GenesisParams::default();
        params.message = "m".repeat(300);
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_cli_parses_mine_command() {
        let cli = Cli::try_parse_from([
            "genesis-miner",
            "mine",
            "--bits",
            "0x207fffff",
            "--threads",
            "4",
        ])
        .unwrap();

        match cli.command {
            Command::Mine(args) => {
                assert_eq!(args.overrides.bits, Some(0x207fffff));
                assert_eq!(args.threads, 4);
                assert!(!args.sequential);
            }
            Command::Verify(_) => panic!("expected mine subcommand"),
        }
    }

    #[test]
    fn test_cli_parses_verify_command() {
        let cli = Cli::try_parse_from([
            "genesis-miner",
            "verify",
            "--nonce",
            "118636",
            "--hash",
            "000092d308e918a0036a633b2c931ad9112b0c83f341b0cbc3fecbcddbbd503e",
        ])
        .unwrap();

        match cli.command {
            Command::Verify(args) => {
                assert_eq!(args.nonce, 118636);
                assert!(args.hash.starts_with("000092d3"));
            }
            Command::Mine(_) => panic!("expected verify subcommand"),
        }
    }
}
