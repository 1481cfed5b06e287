//! Positioned-fragment report parsing.
//!
//! Detailed multi-page exports do not repeat the member name on every row:
//! a section header names the member once, then dated detail lines follow
//! beneath it, often across page boundaries. The scanner reconstructs lines
//! from positioned fragments and threads the current member through a single
//! pass over the whole document.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::duration::parse_hours;
use crate::entry::ResolvedEntry;
use crate::matcher::MemberMatcher;
use crate::normalize::normalize;
use crate::roster::MemberRecord;

/// One positioned text fragment reported by the extraction collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextFragment {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

/// One extracted document page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Page {
    pub fragments: Vec<TextFragment>,
}

/// Fragments whose `y` coordinates differ by less than this belong to the
/// same visual line.
const LINE_TOLERANCE: f64 = 5.0;

/// Pre-compiled pattern for colon-delimited durations (`H:MM:SS`).
static DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+:\d{2}:\d{2}").unwrap());

/// Pre-compiled pattern for `DD/MM/YYYY`-shaped dates marking detail rows.
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{2}/\d{2}/\d{4}").unwrap());

/// Resolved entries and skip count produced from one document report.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentReport {
    pub entries: Vec<ResolvedEntry>,
    pub skipped_lines: usize,
}

/// Scans extracted pages into resolved time entries.
///
/// A line that matches a roster member and carries no date is a section
/// header: it sets the active member for everything that follows, including
/// lines on later pages. Lines containing "total" are summary rows that
/// duplicate the detail rows above them and contribute nothing. A dated line
/// with at least one duration emits its last duration, attributed to the
/// active member (or a same-line match when no section header has been seen
/// yet). Dated duration lines with no attributable member are skipped and
/// counted.
pub fn scan_pages(
    pages: &[Page],
    roster: &[MemberRecord],
    matcher: &impl MemberMatcher,
) -> DocumentReport {
    let mut entries = Vec::new();
    let mut skipped_lines = 0usize;
    let mut ordinal = 0usize;
    let mut active: Option<&MemberRecord> = None;

    for page in pages {
        for line in cluster_lines(&page.fragments) {
            let source_ordinal = ordinal;
            ordinal += 1;

            let normalized = normalize(&line);
            let detected = matcher.best_match(&line, roster);
            if let Some(member) = detected {
                if !DATE_RE.is_match(&normalized) {
                    tracing::trace!(member = %member.id, "section header sets active member");
                    active = Some(member);
                }
            }

            if normalized.contains("total") {
                continue;
            }

            let Some(duration) = DURATION_RE.find_iter(&line).last() else {
                continue;
            };
            if !DATE_RE.is_match(&normalized) {
                continue;
            }

            match active.or(detected) {
                Some(member) => entries.push(ResolvedEntry {
                    raw_label: member.display_name.clone(),
                    hours: parse_hours(duration.as_str()),
                    source_ordinal,
                    member_id: Some(member.id.clone()),
                }),
                None => {
                    tracing::debug!(line = %line, "dated duration line with no attributable member");
                    skipped_lines += 1;
                }
            }
        }
    }

    DocumentReport {
        entries,
        skipped_lines,
    }
}

/// Reassembles a page's fragments into reading-order lines.
///
/// A fragment joins the first line whose anchor `y` lies within
/// [`LINE_TOLERANCE`], otherwise it starts a new line. Lines are ordered
/// top-to-bottom (descending `y`); within a line, fragments run left to
/// right and are joined with single spaces.
fn cluster_lines(fragments: &[TextFragment]) -> Vec<String> {
    let mut buckets: Vec<(f64, Vec<&TextFragment>)> = Vec::new();
    for fragment in fragments {
        match buckets
            .iter_mut()
            .find(|(anchor, _)| (*anchor - fragment.y).abs() < LINE_TOLERANCE)
        {
            Some((_, members)) => members.push(fragment),
            None => buckets.push((fragment.y, vec![fragment])),
        }
    }

    buckets.sort_by(|a, b| b.0.total_cmp(&a.0));
    buckets
        .into_iter()
        .map(|(_, mut members)| {
            members.sort_by(|a, b| a.x.total_cmp(&b.x));
            members
                .iter()
                .map(|fragment| fragment.text.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}
