//! Grouping, hour summation, and token conversion.

use std::collections::HashMap;

use serde::Serialize;

use crate::entry::ResolvedEntry;
use crate::matcher::MemberMatcher;
use crate::normalize::normalize;
use crate::roster::MemberRecord;

/// Fixed conversion rate: reward tokens credited per hour worked.
pub const TOKENS_PER_HOUR: f64 = 0.4;

/// One reviewable credit line in the final output.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CreditEntry {
    /// Resolved roster member, if any.
    pub member_id: Option<String>,

    /// The member's display name, or the first-seen raw label when no
    /// member was resolved.
    pub display_label: String,

    /// Full hour sum attributed to this identity across the whole report.
    pub total_hours: f64,

    /// Whole tokens, computed on the aggregated total.
    pub tokens: u32,

    /// Whether a roster member was resolved.
    pub matched: bool,
}

/// Converts an aggregated hour total into whole tokens.
///
/// Rounds up, and only ever on the aggregate: rounding per row would
/// compound error across many small entries.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn tokens_for_hours(total_hours: f64) -> u32 {
    // total_hours >= 0 by construction, so the ceiling fits in u32 for any
    // report a human could produce.
    (total_hours * TOKENS_PER_HOUR).ceil() as u32
}

struct Group {
    member_id: Option<String>,
    display_label: String,
    total_hours: f64,
}

/// Groups entries by resolved identity, sums hours, and converts to tokens.
///
/// Entries the producing parser did not resolve are matched here against
/// their raw label. Unmatched entries group by normalized raw label so
/// repeated mentions of the same unrecognized name still combine. Output is
/// sorted for human review: tokens descending, then hours descending, then
/// label; never fails.
pub fn aggregate(
    entries: Vec<ResolvedEntry>,
    roster: &[MemberRecord],
    matcher: &impl MemberMatcher,
) -> Vec<CreditEntry> {
    let mut groups: HashMap<String, Group> = HashMap::new();

    for entry in entries {
        let member = match &entry.member_id {
            Some(id) => roster.iter().find(|member| &member.id == id),
            None => matcher.best_match(&entry.raw_label, roster),
        };
        let (key, member_id, display_label) = match member {
            Some(member) => (
                format!("member:{}", member.id),
                Some(member.id.clone()),
                member.display_name.clone(),
            ),
            None => (
                format!("label:{}", normalize(&entry.raw_label)),
                None,
                entry.raw_label.clone(),
            ),
        };
        let group = groups.entry(key).or_insert_with(|| Group {
            member_id,
            display_label,
            total_hours: 0.0,
        });
        group.total_hours += entry.hours;
    }

    let mut credits: Vec<CreditEntry> = groups
        .into_values()
        .map(|group| CreditEntry {
            matched: group.member_id.is_some(),
            tokens: tokens_for_hours(group.total_hours),
            member_id: group.member_id,
            display_label: group.display_label,
            total_hours: group.total_hours,
        })
        .collect();

    credits.sort_by(|a, b| {
        b.tokens
            .cmp(&a.tokens)
            .then_with(|| b.total_hours.total_cmp(&a.total_hours))
            .then_with(|| a.display_label.cmp(&b.display_label))
            .then_with(|| a.member_id.cmp(&b.member_id))
    });
    credits
}
