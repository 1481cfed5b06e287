//! Roster command: validate and list a roster file.

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Args;
use tk_core::MemberRecord;

#[derive(Debug, Args)]
pub struct RosterArgs {
    /// Path to the roster file (JSON array of members).
    pub roster: PathBuf,

    /// Emit JSON instead of the human listing.
    #[arg(long)]
    pub json: bool,
}

/// Loads and validates a roster file.
///
/// Member ids must be non-empty and unique; duplicate ids would silently
/// merge two people's credits.
pub fn load_roster(path: &Path) -> Result<Vec<MemberRecord>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read roster {}", path.display()))?;
    let roster: Vec<MemberRecord> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse roster {}", path.display()))?;

    let mut seen = HashSet::new();
    for member in &roster {
        if member.id.trim().is_empty() {
            bail!("roster member {:?} has an empty id", member.display_name);
        }
        if !seen.insert(member.id.as_str()) {
            bail!("duplicate roster member id: {}", member.id);
        }
    }

    tracing::debug!(members = roster.len(), "loaded roster");
    Ok(roster)
}

pub fn run<W: Write>(writer: &mut W, args: &RosterArgs) -> Result<()> {
    let roster = load_roster(&args.roster)?;

    if args.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&roster)?)?;
        return Ok(());
    }

    writeln!(writer, "Roster: {} member(s)", roster.len())?;
    for member in &roster {
        if member.aliases.is_empty() {
            writeln!(writer, "- {} ({})", member.display_name, member.id)?;
        } else {
            writeln!(
                writer,
                "- {} ({}), {} alias(es)",
                member.display_name,
                member.id,
                member.aliases.len()
            )?;
        }
    }

    Ok(())
}
