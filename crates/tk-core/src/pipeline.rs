//! Ingestion orchestration: format dispatch, extraction await, aggregation.

use std::future::Future;

use serde::Serialize;
use thiserror::Error;

use crate::aggregate::{self, CreditEntry};
use crate::document::{self, Page};
use crate::entry::ResolvedEntry;
use crate::matcher::{MemberMatcher, SubstringMatcher};
use crate::roster::MemberRecord;
use crate::tabular;

/// Declared shape of a report's bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// Delimited row/column text (summary export).
    Tabular,
    /// Multi-page document exposed as positioned text fragments.
    Document,
}

/// Fatal ingestion failures.
///
/// Row-level anomalies never appear here; they are absorbed into
/// [`ReportParseResult::skipped_row_count`] so a single bad line cannot
/// discard an otherwise-valid report.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Tabular input had no data rows.
    #[error("report has no data rows")]
    EmptyReport,

    /// Required identity/duration column(s) could not be located.
    #[error("required column(s) not found in header: {columns}")]
    MissingColumns { columns: String },

    /// The extraction collaborator failed or produced no pages.
    #[error("text extraction failed: {message}")]
    Extraction { message: String },
}

/// The reviewable outcome of one ingestion call.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReportParseResult {
    /// Credit entries, highest tokens first.
    pub entries: Vec<CreditEntry>,

    /// Rows or lines that carried data but could not contribute.
    pub skipped_row_count: usize,
}

/// Supplier of positioned text fragments for document reports.
///
/// This is the engine's single suspension point: extraction is awaited once
/// per document before the line scan begins. Failure is fatal for the whole
/// ingestion call; any retry is a caller concern.
pub trait PageSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Extracts positioned text fragments, one [`Page`] per document page.
    fn extract_pages(
        &self,
        bytes: &[u8],
    ) -> impl Future<Output = Result<Vec<Page>, Self::Error>> + Send;
}

/// Orchestrates one ingestion call.
///
/// Everything is created fresh per call and discarded after the caller reads
/// the result; the roster is read-only for the duration of the call.
#[derive(Debug, Clone, Default)]
pub struct IngestionPipeline<M: MemberMatcher = SubstringMatcher> {
    matcher: M,
}

impl IngestionPipeline {
    /// Pipeline with the default substring matcher.
    pub fn new() -> Self {
        Self {
            matcher: SubstringMatcher,
        }
    }
}

impl<M: MemberMatcher> IngestionPipeline<M> {
    /// Pipeline with a custom matching strategy.
    pub const fn with_matcher(matcher: M) -> Self {
        Self { matcher }
    }

    /// Ingests a delimited tabular report.
    pub fn ingest_tabular(
        &self,
        bytes: &[u8],
        roster: &[MemberRecord],
    ) -> Result<ReportParseResult, IngestError> {
        let parsed = tabular::parse_tabular(bytes)?;
        tracing::debug!(
            entries = parsed.entries.len(),
            skipped = parsed.skipped_rows,
            "parsed tabular report"
        );
        let resolved: Vec<ResolvedEntry> = parsed
            .entries
            .into_iter()
            .map(ResolvedEntry::unresolved)
            .collect();
        Ok(ReportParseResult {
            entries: aggregate::aggregate(resolved, roster, &self.matcher),
            skipped_row_count: parsed.skipped_rows,
        })
    }

    /// Ingests a positioned-fragment document report.
    pub async fn ingest_document<S: PageSource>(
        &self,
        bytes: &[u8],
        roster: &[MemberRecord],
        source: &S,
    ) -> Result<ReportParseResult, IngestError> {
        let pages = source
            .extract_pages(bytes)
            .await
            .map_err(|err| IngestError::Extraction {
                message: err.to_string(),
            })?;
        if pages.is_empty() {
            return Err(IngestError::Extraction {
                message: "document produced no text pages".to_string(),
            });
        }
        tracing::debug!(pages = pages.len(), "extracted document pages");

        let scanned = document::scan_pages(&pages, roster, &self.matcher);
        tracing::debug!(
            entries = scanned.entries.len(),
            skipped = scanned.skipped_lines,
            "scanned document report"
        );
        Ok(ReportParseResult {
            entries: aggregate::aggregate(scanned.entries, roster, &self.matcher),
            skipped_row_count: scanned.skipped_lines,
        })
    }

    /// Dispatches on the declared report kind.
    pub async fn ingest<S: PageSource>(
        &self,
        kind: ReportKind,
        bytes: &[u8],
        roster: &[MemberRecord],
        source: &S,
    ) -> Result<ReportParseResult, IngestError> {
        match kind {
            ReportKind::Tabular => self.ingest_tabular(bytes, roster),
            ReportKind::Document => self.ingest_document(bytes, roster, source).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::TextFragment;

    const EPS: f64 = 1e-9;

    fn roster() -> Vec<MemberRecord> {
        vec![
            MemberRecord::new("m1", "Ana Silva"),
            MemberRecord::new("m2", "Bruno Costa"),
        ]
    }

    /// Page source returning a fixed page set.
    struct StaticPages(Vec<Page>);

    impl PageSource for StaticPages {
        type Error = std::convert::Infallible;

        async fn extract_pages(&self, _bytes: &[u8]) -> Result<Vec<Page>, Self::Error> {
            Ok(self.0.clone())
        }
    }

    #[derive(Debug, Error)]
    #[error("extractor unavailable")]
    struct StubFailure;

    /// Page source that always fails.
    struct FailingSource;

    impl PageSource for FailingSource {
        type Error = StubFailure;

        async fn extract_pages(&self, _bytes: &[u8]) -> Result<Vec<Page>, Self::Error> {
            Err(StubFailure)
        }
    }

    fn line(text: &str, y: f64) -> TextFragment {
        TextFragment {
            text: text.to_string(),
            x: 0.0,
            y,
        }
    }

    #[test]
    fn tabular_concrete_scenario() {
        let result = IngestionPipeline::new()
            .ingest_tabular(b"User;Duration\nAna Silva;01:30:00\n", &roster())
            .unwrap();

        assert_eq!(result.entries.len(), 1);
        let credit = &result.entries[0];
        assert_eq!(credit.display_label, "Ana Silva");
        assert!((credit.total_hours - 1.5).abs() < EPS);
        // ceil(1.5 * 0.4) = 1
        assert_eq!(credit.tokens, 1);
        assert!(credit.matched);
        assert_eq!(result.skipped_row_count, 0);
    }

    #[test]
    fn tabular_conserves_hours_across_aggregation() {
        let bytes = b"User;Duration\nAna Silva;01:30:00\nAna Silva;00:30:00\nDesconhecido;02:00:00\n";
        let result = IngestionPipeline::new()
            .ingest_tabular(bytes, &roster())
            .unwrap();

        let total: f64 = result.entries.iter().map(|entry| entry.total_hours).sum();
        assert!((total - 4.0).abs() < EPS);
    }

    #[test]
    fn tabular_malformed_row_is_counted_not_fatal() {
        let bytes = b"User;Duration\nAna Silva;abc\nBruno Costa;01:00:00\n";
        let result = IngestionPipeline::new()
            .ingest_tabular(bytes, &roster())
            .unwrap();

        assert_eq!(result.skipped_row_count, 1);
        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.entries[0].display_label, "Bruno Costa");
    }

    #[test]
    fn tabular_ingestion_is_idempotent() {
        let bytes = b"User;Duration\nAna Silva;01:30:00\nBruno Costa;02:15:00\nX;0,5\n";
        let pipeline = IngestionPipeline::new();
        let first = pipeline.ingest_tabular(bytes, &roster()).unwrap();
        let second = pipeline.ingest_tabular(bytes, &roster()).unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn document_flow_attributes_and_aggregates() {
        let source = StaticPages(vec![
            Page {
                fragments: vec![
                    line("Ana Silva", 800.0),
                    line("10/01/2025 checkout 01:00:00", 780.0),
                ],
            },
            Page {
                fragments: vec![line("11/01/2025 reviews 00:30:00", 800.0)],
            },
        ]);
        let result = IngestionPipeline::new()
            .ingest(ReportKind::Document, b"%PDF", &roster(), &source)
            .await
            .unwrap();

        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.entries[0].member_id.as_deref(), Some("m1"));
        assert!((result.entries[0].total_hours - 1.5).abs() < EPS);
        assert_eq!(result.entries[0].tokens, 1);
    }

    #[tokio::test]
    async fn extraction_failure_is_fatal() {
        let err = IngestionPipeline::new()
            .ingest_document(b"%PDF", &roster(), &FailingSource)
            .await
            .unwrap_err();
        match err {
            IngestError::Extraction { message } => {
                assert!(message.contains("extractor unavailable"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn zero_pages_is_fatal() {
        let err = IngestionPipeline::new()
            .ingest_document(b"%PDF", &roster(), &StaticPages(Vec::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::Extraction { .. }));
    }

    #[tokio::test]
    async fn dispatch_routes_tabular_without_touching_the_source() {
        let result = IngestionPipeline::new()
            .ingest(
                ReportKind::Tabular,
                b"User;Duration\nAna Silva;01:00:00\n",
                &roster(),
                &FailingSource,
            )
            .await
            .unwrap();
        assert_eq!(result.entries.len(), 1);
    }
}
