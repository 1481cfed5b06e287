//! CLI subcommand implementations.

pub mod ingest;
pub mod roster;
