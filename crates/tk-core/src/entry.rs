//! Intermediate entry types produced by the report parsers.

/// One detected work-duration occurrence, before identity resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTimeEntry {
    /// The free-text label the duration was found under.
    pub raw_label: String,

    /// Fractional hours, always `>= 0`.
    pub hours: f64,

    /// Position of the occurrence in the source report (row or line index),
    /// kept for stable downstream ordering and diagnostics.
    pub source_ordinal: usize,
}

/// A [`RawTimeEntry`] with identity resolution applied.
///
/// Parsers that already know the member (the document scanner tracks one
/// through its section headers) fill `member_id`; the aggregator resolves
/// the rest. Unmatched entries keep `raw_label` as their display label.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEntry {
    pub raw_label: String,
    pub hours: f64,
    pub source_ordinal: usize,
    pub member_id: Option<String>,
}

impl ResolvedEntry {
    /// Wraps a raw entry that has not been resolved yet.
    pub fn unresolved(entry: RawTimeEntry) -> Self {
        Self {
            raw_label: entry.raw_label,
            hours: entry.hours,
            source_ordinal: entry.source_ordinal,
            member_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_keeps_fields_and_clears_member() {
        let raw = RawTimeEntry {
            raw_label: "Ana Silva".to_string(),
            hours: 1.5,
            source_ordinal: 3,
        };
        let resolved = ResolvedEntry::unresolved(raw);
        assert_eq!(resolved.raw_label, "Ana Silva");
        assert_eq!(resolved.source_ordinal, 3);
        assert!(resolved.member_id.is_none());
    }
}
