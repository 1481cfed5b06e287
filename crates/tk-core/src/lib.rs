//! Report ingestion and token conversion engine for the rewards store.
//!
//! Turns an exported time-tracking report — delimited tabular text, or a
//! multi-page document exposed only as positioned text fragments — into a
//! reviewable list of integer reward-token credits attributed to roster
//! members. The engine only proposes credits; applying them to balances is
//! the caller's concern.

pub mod aggregate;
pub mod document;
pub mod duration;
pub mod entry;
pub mod matcher;
pub mod normalize;
pub mod pipeline;
pub mod roster;
pub mod tabular;

pub use aggregate::{CreditEntry, TOKENS_PER_HOUR};
pub use document::{Page, TextFragment};
pub use entry::{RawTimeEntry, ResolvedEntry};
pub use matcher::{MemberMatcher, SubstringMatcher};
pub use pipeline::{IngestError, IngestionPipeline, PageSource, ReportKind, ReportParseResult};
pub use roster::MemberRecord;
