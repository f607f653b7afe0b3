//! Cellseg CLI library.
//!
//! This crate provides the CLI interface for the segmentation engine:
//! argument parsing, layered configuration and canonical CSV loading.

mod cli;
pub mod commands;
mod config;
pub mod load;

pub use cli::{Cli, Commands};
pub use config::Config;
