//! Ingest command: report bytes in, reviewable credit list out.
//!
//! The engine never touches balances; this command prints the candidate
//! credits (human table or JSON) for the operator to confirm elsewhere.

use std::fmt::Write as _;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, ValueEnum};
use tk_core::{IngestionPipeline, ReportKind, ReportParseResult};
use tk_extract::FragmentFile;

use crate::Config;
use crate::commands::roster::load_roster;

/// Report kind as declared on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    /// Delimited row/column text export.
    Tabular,
    /// Document whose text arrives as positioned fragments.
    Document,
}

impl From<KindArg> for ReportKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Tabular => Self::Tabular,
            KindArg::Document => Self::Document,
        }
    }
}

#[derive(Debug, Args)]
pub struct IngestArgs {
    /// Path to the exported report.
    pub report: PathBuf,

    /// Path to the roster file (JSON array of members).
    #[arg(long)]
    pub roster: PathBuf,

    /// Report kind; sniffed from the file extension when omitted.
    #[arg(long, value_enum)]
    pub kind: Option<KindArg>,

    /// Treat the report bytes as a pre-extracted fragment dump instead of
    /// calling the extraction service. Implies a document report.
    #[arg(long)]
    pub pre_extracted: bool,

    /// Emit JSON instead of the human review table.
    #[arg(long)]
    pub json: bool,
}

pub fn run<W: Write>(writer: &mut W, args: &IngestArgs, config: &Config) -> Result<()> {
    let roster = load_roster(&args.roster)?;
    let bytes = fs::read(&args.report)
        .with_context(|| format!("failed to read report {}", args.report.display()))?;

    let kind = args.kind.map_or_else(
        || {
            if args.pre_extracted {
                ReportKind::Document
            } else {
                sniff_kind(&args.report)
            }
        },
        ReportKind::from,
    );
    tracing::debug!(?kind, report = %args.report.display(), "ingesting report");

    let pipeline = IngestionPipeline::new();
    let result = match kind {
        ReportKind::Tabular => pipeline.ingest_tabular(&bytes, &roster)?,
        ReportKind::Document => {
            let runtime =
                tokio::runtime::Runtime::new().context("failed to initialize tokio runtime")?;
            if args.pre_extracted {
                runtime.block_on(pipeline.ingest_document(&bytes, &roster, &FragmentFile))?
            } else {
                let endpoint = config
                    .extractor_url
                    .as_deref()
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
                    .ok_or_else(|| {
                        anyhow::anyhow!(
                            "missing extraction endpoint (set TK_EXTRACTOR_URL or config.toml)"
                        )
                    })?;
                let client = tk_extract::Client::new(endpoint)
                    .context("failed to create extraction client")?;
                runtime.block_on(pipeline.ingest_document(&bytes, &roster, &client))?
            }
        }
    };

    if args.json {
        let output = serde_json::json!({
            "generated_at": Utc::now(),
            "report": args.report.display().to_string(),
            "skipped_row_count": result.skipped_row_count,
            "entries": result.entries,
        });
        writeln!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
    } else {
        write!(writer, "{}", format_review(&result))?;
    }

    Ok(())
}

/// Sniffs the report kind from the file extension.
fn sniff_kind(path: &Path) -> ReportKind {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("pdf") => ReportKind::Document,
        _ => ReportKind::Tabular,
    }
}

/// Formats fractional hours as a duration string.
/// Returns "Xh Ym" if >= 1 hour, "Ym" if below.
#[allow(clippy::cast_possible_truncation)]
fn format_hours(hours: f64) -> String {
    let total_minutes = (hours * 60.0).round().max(0.0) as i64;
    let h = total_minutes / 60;
    let m = total_minutes % 60;

    if h >= 1 {
        format!("{h}h {m}m")
    } else {
        format!("{m}m")
    }
}

/// Formats the human-readable review table.
pub fn format_review(result: &ReportParseResult) -> String {
    let mut output = String::new();
    writeln!(output, "CREDIT REVIEW: {} identities", result.entries.len()).unwrap();

    if result.entries.is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "No credits found in this report.").unwrap();
        if result.skipped_row_count > 0 {
            writeln!(output, "Skipped rows: {}", result.skipped_row_count).unwrap();
        }
        return output;
    }

    writeln!(output).unwrap();
    for entry in &result.entries {
        let marker = if entry.matched {
            ""
        } else {
            "  (no roster match)"
        };
        writeln!(
            output,
            "{:<24} {:>8} {:>5} TK{marker}",
            entry.display_label,
            format_hours(entry.total_hours),
            entry.tokens
        )
        .unwrap();
    }

    let total_hours: f64 = result.entries.iter().map(|entry| entry.total_hours).sum();
    let total_tokens: u32 = result.entries.iter().map(|entry| entry.tokens).sum();
    writeln!(output).unwrap();
    writeln!(
        output,
        "TOTAL: {} -> {} TK",
        format_hours(total_hours),
        total_tokens
    )
    .unwrap();
    if result.skipped_row_count > 0 {
        writeln!(output, "Skipped rows: {}", result.skipped_row_count).unwrap();
    }

    output
}
