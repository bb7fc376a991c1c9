//! Diff-status enum shared by the part differ and its HTTP rendering.

use serde::{Deserialize, Serialize};

/// The status of one entry in a page diff.
///
/// - `Baseline`  -- single-page form; the part is listed with nothing to compare.
/// - `Added`     -- present only in the new page.
/// - `Deleted`   -- present only in the old page.
/// - `Changed`   -- present in both pages with different attributes.
/// - `Unchanged` -- present in both pages with identical attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffStatus {
    Baseline,
    Added,
    Deleted,
    Changed,
    Unchanged,
}

impl DiffStatus {
    /// String representation for display and logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Baseline => "baseline",
            Self::Added => "added",
            Self::Deleted => "deleted",
            Self::Changed => "changed",
            Self::Unchanged => "unchanged",
        }
    }

    /// Whether the entry represents an actual difference between two pages.
    pub fn is_change(&self) -> bool {
        matches!(self, Self::Added | Self::Deleted | Self::Changed)
    }
}

impl std::fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
