//! Identity resolution: mapping free-text labels to roster members.

use crate::normalize::normalize;
use crate::roster::MemberRecord;

/// Strategy for resolving a free-text label to a roster member.
///
/// This is a trait so the parsers stay decoupled from the matching policy: a
/// stricter exact-alias-table lookup can replace [`SubstringMatcher`] without
/// touching them.
pub trait MemberMatcher {
    /// Returns the best-matching roster member for `label`, or `None`.
    fn best_match<'r>(
        &self,
        label: &str,
        roster: &'r [MemberRecord],
    ) -> Option<&'r MemberRecord>;
}

/// Default matcher: normalized substring containment.
///
/// Candidates are every member's display name plus all aliases, tried in
/// descending length order so a short name cannot shadow a longer one it is
/// a prefix of ("João" vs "João Luiz Mateus de Lima"). Equal-length ties
/// resolve to the earliest roster entry — deterministic, but roster-order
/// dependent.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringMatcher;

impl MemberMatcher for SubstringMatcher {
    fn best_match<'r>(
        &self,
        label: &str,
        roster: &'r [MemberRecord],
    ) -> Option<&'r MemberRecord> {
        let text = normalize(label);
        if text.is_empty() {
            return None;
        }

        let mut candidates: Vec<(String, usize)> = Vec::new();
        for (index, member) in roster.iter().enumerate() {
            let name = normalize(&member.display_name);
            if !name.is_empty() {
                candidates.push((name, index));
            }
            for alias in &member.aliases {
                let alias = normalize(alias);
                if !alias.is_empty() {
                    candidates.push((alias, index));
                }
            }
        }
        // Stable sort keeps roster order for equal-length candidates.
        candidates.sort_by_key(|(candidate, _)| std::cmp::Reverse(candidate.len()));

        candidates
            .iter()
            .find(|(candidate, _)| text.contains(candidate.as_str()))
            .map(|&(_, index)| &roster[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Vec<MemberRecord> {
        vec![
            MemberRecord::new("m1", "João"),
            MemberRecord::new("m2", "João Luiz Mateus de Lima"),
            MemberRecord::with_aliases("m3", "Ana Silva", vec!["anasilva.dev".to_string()]),
        ]
    }

    #[test]
    fn matches_exact_display_name() {
        let roster = roster();
        let found = SubstringMatcher.best_match("Ana Silva", &roster).unwrap();
        assert_eq!(found.id, "m3");
    }

    #[test]
    fn longer_candidate_wins_over_its_prefix() {
        let roster = roster();
        let found = SubstringMatcher
            .best_match("João Luiz Mateus de Lima - detail", &roster)
            .unwrap();
        assert_eq!(found.id, "m2");
    }

    #[test]
    fn short_name_still_matches_alone() {
        let roster = roster();
        let found = SubstringMatcher.best_match("10/01/2025 João", &roster).unwrap();
        assert_eq!(found.id, "m1");
    }

    #[test]
    fn matches_via_alias() {
        let roster = roster();
        let found = SubstringMatcher
            .best_match("anasilva.dev worked on checkout", &roster)
            .unwrap();
        assert_eq!(found.id, "m3");
    }

    #[test]
    fn matching_ignores_case_and_accents() {
        let roster = roster();
        let found = SubstringMatcher.best_match("ANA  SÍLVA", &roster);
        // Diacritics are stripped on both sides.
        assert_eq!(found.map(|m| m.id.as_str()), Some("m3"));
    }

    #[test]
    fn equal_length_tie_takes_roster_order() {
        let roster = vec![
            MemberRecord::new("first", "Lia"),
            MemberRecord::new("second", "Lía"),
        ];
        let found = SubstringMatcher.best_match("lia - tasks", &roster).unwrap();
        assert_eq!(found.id, "first");
    }

    #[test]
    fn no_match_for_unknown_or_empty_labels() {
        let roster = roster();
        assert!(SubstringMatcher.best_match("Carlos Pereira", &roster).is_none());
        assert!(SubstringMatcher.best_match("   ", &roster).is_none());
        assert!(SubstringMatcher.best_match("Ana Silva", &[]).is_none());
    }
}
