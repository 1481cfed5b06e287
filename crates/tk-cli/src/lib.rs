//! Rewards-store report ingestion CLI library.
//!
//! This crate provides the `tk` command-line interface over the ingestion
//! engine.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands};
pub use config::Config;
