//! cairn-cli: inspect and query the hard-coded checkpoints.
//!
//! Lists the active checkpoint table, reports the progress estimate,
//! verifies a block hash against the hardened checkpoints, and shows where
//! the reorg floor sits for a given chain height.

mod config;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};

use cairn_consensus::checkpoint::{auto_select_sync_checkpoint, check_sync};
use cairn_consensus::CheckpointGuard;
use cairn_core::block_index::{BlockIndexView, MemoryBlockIndex};
use cairn_core::constants::{CHECKPOINT_SPAN, NetworkType};
use cairn_core::types::Hash256;

use crate::config::{GuardConfig, LogFormat};

/// Highest tip accepted by `floor`; the synthetic chain is held in memory.
const MAX_FLOOR_TIP_HEIGHT: u64 = 1_000_000;

/// Cairn checkpoint tool.
#[derive(Parser, Debug)]
#[command(name = "cairn-cli", version, about = "Inspect and query hard-coded checkpoints")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Use the test network checkpoints (none are defined).
    #[arg(long, global = true, conflicts_with = "regtest")]
    testnet: bool,

    /// Use the regression-test network checkpoints (none are defined).
    #[arg(long, global = true, conflicts_with = "testnet")]
    regtest: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Log output format ("text" or "json")
    #[arg(long, global = true, default_value = "text")]
    log_format: LogFormat,
}

impl GlobalArgs {
    /// Convert CLI args into a GuardConfig.
    fn into_config(self) -> GuardConfig {
        let network = if self.regtest {
            NetworkType::Regtest
        } else if self.testnet {
            NetworkType::Testnet
        } else {
            NetworkType::Mainnet
        };

        GuardConfig {
            network,
            log_level: self.log_level,
            log_format: self.log_format,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print every checkpoint of the active network.
    List {
        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Print the highest checkpointed height (a rough chain-length estimate).
    Estimate,
    /// Check a block hash against the hardened checkpoint at its height.
    Verify {
        /// Block height.
        height: u64,
        /// Block hash, 64 hex digits with optional 0x prefix.
        hash: String,
    },
    /// Show the sync checkpoint for a chain whose best tip is at `tip_height`.
    Floor {
        #[arg(long, value_parser = clap::value_parser!(u64).range(0..=MAX_FLOOR_TIP_HEIGHT))]
        tip_height: u64,
    },
}

#[derive(Serialize)]
struct CheckpointRow {
    height: u64,
    hash: String,
}

#[derive(Serialize, Debug, PartialEq, Eq)]
struct FloorReport {
    tip_height: u64,
    span: u64,
    sync_height: u64,
    first_admissible_height: u64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.global.into_config();
    init_logging(&config.log_level, config.log_format);

    debug!(network = %config.network, "cairn-cli v{}", env!("CARGO_PKG_VERSION"));
    let guard = CheckpointGuard::new(config.network);

    match cli.command {
        Commands::List { json } => cmd_list(&guard, json),
        Commands::Estimate => {
            println!("{}", guard.total_blocks_estimate());
            Ok(())
        }
        Commands::Verify { height, hash } => cmd_verify(&guard, height, &hash),
        Commands::Floor { tip_height } => cmd_floor(tip_height),
    }
}

fn cmd_list(guard: &CheckpointGuard, json: bool) -> Result<()> {
    let rows: Vec<CheckpointRow> = guard
        .table()
        .iter()
        .map(|(height, hash)| CheckpointRow {
            height,
            hash: hash.to_string(),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    if rows.is_empty() {
        println!("no checkpoints on {}", guard.network());
        return Ok(());
    }
    for row in rows {
        println!("{:>8}  {}", row.height, row.hash);
    }
    Ok(())
}

fn cmd_verify(guard: &CheckpointGuard, height: u64, hash: &str) -> Result<()> {
    let hash: Hash256 = hash.parse().context("invalid block hash")?;
    let Some(expected) = guard.table().get(height) else {
        println!("no checkpoint at height {height}");
        return Ok(());
    };
    if !guard.check_hardened(height, &hash) {
        bail!("checkpoint mismatch at height {height}: expected {expected}, got {hash}");
    }
    println!("ok: height {height} matches checkpoint");
    Ok(())
}

/// Synthetic hash for the block at `height`; only used to build a walkable chain.
fn synthetic_hash(height: u64) -> Hash256 {
    let mut bytes = [0u8; 32];
    bytes[24..].copy_from_slice(&height.to_be_bytes());
    Hash256::from_bytes(bytes)
}

fn cmd_floor(tip_height: u64) -> Result<()> {
    let report = floor_report(tip_height)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn floor_report(tip_height: u64) -> Result<FloorReport> {
    if tip_height > MAX_FLOOR_TIP_HEIGHT {
        bail!("tip height {tip_height} exceeds the limit of {MAX_FLOOR_TIP_HEIGHT}");
    }
    let mut index = MemoryBlockIndex::with_genesis(synthetic_hash(0));
    for height in 1..=tip_height {
        index.insert(&synthetic_hash(height - 1), synthetic_hash(height))?;
    }
    let tip = index.set_best_tip(&synthetic_hash(tip_height))?;
    info!(blocks = index.len(), "built synthetic chain");

    let sync = auto_select_sync_checkpoint(&index, tip);
    let sync_height = index.height(sync);
    let first_admissible_height = [sync_height, sync_height + 1]
        .into_iter()
        .find(|&height| check_sync(&index, height))
        .context("reorg guard admits nothing above the sync checkpoint")?;

    Ok(FloorReport {
        tip_height,
        span: CHECKPOINT_SPAN,
        sync_height,
        first_admissible_height,
    })
}

/// Initialize tracing subscriber with the given log level and output format.
///
/// Logs go to stderr so command output on stdout stays machine-readable.
fn init_logging(level_str: &str, format: LogFormat) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_str));

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}
