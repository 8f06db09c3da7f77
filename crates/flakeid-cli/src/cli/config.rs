use std::time::Duration;

use anyhow::bail;
use clap::{Parser, Subcommand};
use flakeid::{AllocatorConfig, DEFAULT_EPOCH, SnowflakeId};

/// Command-line arguments for the `flakeid` binary.
///
/// Every global option can also be supplied through the environment (or a
/// `.env` file in the working directory).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "flakeid",
    version,
    about = "Mint and inspect 64-bit Snowflake IDs"
)]
pub struct CliArgs {
    /// Datacenter component of the allocator identity (0..=31).
    ///
    /// Environment variable: `FLAKEID_DATACENTER_ID`
    #[arg(long, global = true, env = "FLAKEID_DATACENTER_ID", default_value_t = flakeid::DEFAULT_DATACENTER_ID)]
    pub datacenter_id: i64,

    /// Worker component of the allocator identity (0..=31).
    ///
    /// Environment variable: `FLAKEID_WORKER_ID`
    #[arg(long, global = true, env = "FLAKEID_WORKER_ID", default_value_t = flakeid::DEFAULT_WORKER_ID)]
    pub worker_id: i64,

    /// Custom epoch, in milliseconds since the Unix epoch.
    ///
    /// IDs minted and decoded with different epochs do not agree on time.
    ///
    /// Environment variable: `FLAKEID_EPOCH_MS`
    #[arg(long, global = true, env = "FLAKEID_EPOCH_MS", default_value_t = DEFAULT_EPOCH.as_millis() as u64)]
    pub epoch_ms: u64,

    /// Emit one JSON object per ID instead of plain text.
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Mint new IDs, one per line.
    Generate {
        /// Number of IDs to mint.
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
    },
    /// Unpack existing IDs into their components.
    Decode {
        /// Raw decimal IDs.
        #[arg(required = true)]
        ids: Vec<u64>,
    },
}

/// Validated runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub allocator: AllocatorConfig,
    pub epoch: Duration,
    pub json: bool,
    pub command: Command,
}

impl TryFrom<CliArgs> for Config {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if !(0..=SnowflakeId::MAX_DATACENTER_ID as i64).contains(&args.datacenter_id) {
            bail!(
                "FLAKEID_DATACENTER_ID ({}) is outside 0..={}",
                args.datacenter_id,
                SnowflakeId::MAX_DATACENTER_ID
            );
        }

        if !(0..=SnowflakeId::MAX_WORKER_ID as i64).contains(&args.worker_id) {
            bail!(
                "FLAKEID_WORKER_ID ({}) is outside 0..={}",
                args.worker_id,
                SnowflakeId::MAX_WORKER_ID
            );
        }

        if let Command::Generate { count: 0 } = args.command {
            bail!("--count must be greater than 0");
        }

        Ok(Self {
            allocator: AllocatorConfig {
                datacenter_id: args.datacenter_id,
                worker_id: args.worker_id,
            },
            epoch: Duration::from_millis(args.epoch_ms),
            json: args.json,
            command: args.command,
        })
    }
}
