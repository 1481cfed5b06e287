//! Roster records supplied by the caller's membership store.

use serde::{Deserialize, Serialize};

/// A staff member known to the rewards store.
///
/// The roster is read-only for the duration of an ingestion call; this
/// engine never writes back to the membership store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemberRecord {
    /// Stable identifier in the membership store.
    pub id: String,

    /// Name shown in review output.
    pub display_name: String,

    /// Alternate labels this member appears under in exported reports
    /// (time-tracker account names, abbreviations). Order is preserved.
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl MemberRecord {
    /// Creates a member with no aliases.
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            aliases: Vec::new(),
        }
    }

    /// Creates a member with the given aliases.
    pub fn with_aliases(
        id: impl Into<String>,
        display_name: impl Into<String>,
        aliases: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            aliases,
        }
    }
}
