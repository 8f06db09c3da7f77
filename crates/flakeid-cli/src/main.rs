#![doc = include_str!("../README.md")]

mod cli;

use std::io::{BufWriter, Write};

use clap::Parser;
use cli::config::{CliArgs, Command, Config};
use cli::output::{DecodedId, write_decoded, write_generated};
use cli::telemetry::init_telemetry;
use flakeid::{SnowflakeId, WallClock};

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = Config::try_from(args)?;

    init_telemetry()?;
    tracing::debug!(?config, "starting flakeid");

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match &config.command {
        Command::Generate { count } => generate(&mut out, &config, *count)?,
        Command::Decode { ids } => decode(&mut out, &config, ids)?,
    }

    out.flush()?;
    Ok(())
}

fn generate<W: Write>(out: &mut W, config: &Config, count: usize) -> anyhow::Result<()> {
    let allocator = config
        .allocator
        .build_with_clock(WallClock::with_epoch(config.epoch))?;
    tracing::info!(
        datacenter_id = allocator.datacenter_id(),
        worker_id = allocator.worker_id(),
        count,
        "generating ids"
    );

    for _ in 0..count {
        let id = allocator.try_generate()?;
        write_generated(out, id, config.epoch, config.json)?;
    }
    Ok(())
}

fn decode<W: Write>(out: &mut W, config: &Config, ids: &[u64]) -> anyhow::Result<()> {
    for &raw in ids {
        let decoded = DecodedId::new(SnowflakeId::from_raw(raw), config.epoch)?;
        write_decoded(out, &decoded, config.json)?;
    }
    Ok(())
}
