//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Segment battery cycler time series into regimes.
///
/// Reads a canonical CSV export and reports the row ranges matching
/// requests such as `"rest"`, `"cc 1.67A"` or `"cv, rest"`.
#[derive(Debug, Parser)]
#[command(name = "cellseg", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run one or more segmentation requests.
    Segment {
        /// Canonical CSV file.
        file: PathBuf,

        /// Requests such as "rest", "cc 1.67A" or "cv, rest".
        #[arg(required = true)]
        requests: Vec<String>,

        /// Shift each segment's time so it starts at zero.
        #[arg(long)]
        reset_time: bool,

        /// Widen each match with its adjacent rest periods.
        #[arg(long)]
        with_rest: bool,

        /// Link chained conditions backwards in time.
        #[arg(long)]
        preceding: bool,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the rest periods adjacent to every match of a request.
    Rest {
        /// Canonical CSV file.
        file: PathBuf,

        /// Request whose matches to look around.
        request: String,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Summarize a series and count segments per regime.
    Inspect {
        /// Canonical CSV file.
        file: PathBuf,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}
