//! Delimited (CSV-style) report parsing.
//!
//! Summary exports carry one row per member with a total duration column.
//! The header names vary by export language, so columns are located by
//! keyword against normalized names rather than by position.

use crate::duration::parse_hours_checked;
use crate::entry::RawTimeEntry;
use crate::normalize::normalize;
use crate::pipeline::IngestError;

/// Normalized header fragments that mark the identity column.
const IDENTITY_KEYWORDS: &[&str] = &["user", "usuario", "nome", "name"];

/// Normalized header fragments that mark the duration column.
const DURATION_KEYWORDS: &[&str] = &["duration", "duracao", "time", "tempo"];

/// Raw entries and skip count produced from one tabular report.
#[derive(Debug, Clone, PartialEq)]
pub struct TabularReport {
    pub entries: Vec<RawTimeEntry>,
    pub skipped_rows: usize,
}

/// Parses a delimited report into raw time entries.
///
/// The delimiter is sniffed from the header line (`;` if present, else `,`).
/// Rows missing the identity or duration cell, or carrying an unparsable
/// duration, are skipped and counted rather than aborting the report.
pub fn parse_tabular(bytes: &[u8]) -> Result<TabularReport, IngestError> {
    let text = String::from_utf8_lossy(bytes);
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    if lines.len() < 2 {
        return Err(IngestError::EmptyReport);
    }

    let header = lines[0];
    let delimiter = if header.contains(';') { ';' } else { ',' };
    let columns: Vec<String> = split_row(header, delimiter)
        .iter()
        .map(|cell| normalize(cell))
        .collect();

    let identity_idx = find_column(&columns, IDENTITY_KEYWORDS);
    let duration_idx = find_column(&columns, DURATION_KEYWORDS);
    let (identity_idx, duration_idx) = match (identity_idx, duration_idx) {
        (Some(identity), Some(duration)) => (identity, duration),
        (identity, duration) => {
            let mut missing = Vec::new();
            if identity.is_none() {
                missing.push("identity");
            }
            if duration.is_none() {
                missing.push("duration");
            }
            return Err(IngestError::MissingColumns {
                columns: missing.join(", "),
            });
        }
    };
    tracing::debug!(%delimiter, identity_idx, duration_idx, "located report columns");

    let mut entries = Vec::new();
    let mut skipped_rows = 0usize;
    for (ordinal, row) in lines[1..].iter().enumerate() {
        let cells = split_row(row, delimiter);
        let identity = cells.get(identity_idx).map_or("", String::as_str);
        let duration = cells.get(duration_idx).map_or("", String::as_str);

        if identity.is_empty() || duration.is_empty() {
            skipped_rows += 1;
            continue;
        }
        match parse_hours_checked(duration) {
            Some(hours) => entries.push(RawTimeEntry {
                raw_label: identity.to_string(),
                hours,
                source_ordinal: ordinal,
            }),
            None => {
                tracing::debug!(row = ordinal, duration, "skipping row with malformed duration");
                skipped_rows += 1;
            }
        }
    }

    Ok(TabularReport {
        entries,
        skipped_rows,
    })
}

/// Splits one row on `delimiter`, treating delimiters inside a matched quote
/// pair as cell content. Quote characters are stripped and cells trimmed.
fn split_row(row: &str, delimiter: char) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in row.chars() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if c == delimiter && !in_quotes {
            cells.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    cells.push(current);

    cells.iter().map(|cell| cell.trim().to_string()).collect()
}

/// First column whose normalized name contains any of the keywords.
fn find_column(columns: &[String], keywords: &[&str]) -> Option<usize> {
    columns
        .iter()
        .position(|name| keywords.iter().any(|keyword| name.contains(keyword)))
}
