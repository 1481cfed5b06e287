//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::ingest::IngestArgs;
use crate::commands::roster::RosterArgs;

/// Reward-token report ingestion.
///
/// Converts exported time-tracking reports into a reviewable list of
/// integer token credits for known staff members.
#[derive(Debug, Parser)]
#[command(name = "tk", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Ingest a report and print the credit review list.
    Ingest(IngestArgs),

    /// Validate and list a roster file.
    Roster(RosterArgs),
}
