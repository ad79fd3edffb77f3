//! End-of-run report.

use serde::{Deserialize, Serialize};

use super::claim::UnresolvedReference;

/// Counts and artifacts produced by one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// Data rows in the source table
    pub rows_total: usize,

    /// Rows that produced an evidence note
    pub rows_processed: usize,

    /// Rows skipped (blank title, model failure, zero items)
    pub rows_skipped: usize,

    pub evidence_files_written: usize,

    /// Evidence items across all written notes
    pub evidence_items: usize,

    pub citekey_collisions: usize,

    pub claims_synthesized: usize,

    pub unresolved_references: Vec<UnresolvedReference>,

    /// Locations of the evidence notes, in write order
    pub evidence_files: Vec<String>,

    /// Location of the claims note
    pub claims_file: Option<String>,
}

impl RunSummary {
    pub fn unresolved_count(&self) -> usize {
        self.unresolved_references.len()
    }
}
