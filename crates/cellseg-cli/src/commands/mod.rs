//! CLI subcommand implementations.

pub mod inspect;
pub mod rest;
pub mod segment;
