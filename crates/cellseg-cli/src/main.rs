use std::path::Path;

use anyhow::{Context, Result};
use cellseg_core::Series;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cellseg_cli::commands::{inspect, rest, segment};
use cellseg_cli::{Cli, Commands, Config, load};

/// Load config and the series a command operates on.
fn open_series(config_path: Option<&Path>, file: &Path) -> Result<(Series, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let series = load::load_series(file)?;
    Ok((series, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    match &cli.command {
        Commands::Segment {
            file,
            requests,
            reset_time,
            with_rest,
            preceding,
            json,
        } => {
            let (series, config) = open_series(cli.config.as_deref(), file)?;
            let options = segment::SegmentOptions {
                reset_time: *reset_time,
                with_rest: *with_rest,
                preceding: *preceding,
                json: *json,
            };
            segment::run(&series, &config.segmentation, requests, options)?;
        }
        Commands::Rest {
            file,
            request,
            json,
        } => {
            let (series, config) = open_series(cli.config.as_deref(), file)?;
            rest::run(&series, &config.segmentation, request, *json)?;
        }
        Commands::Inspect { file, json } => {
            let (series, config) = open_series(cli.config.as_deref(), file)?;
            inspect::run(&series, &config.segmentation, *json)?;
        }
    }

    Ok(())
}
