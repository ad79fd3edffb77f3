//! Storage trait for rendered notes.
//!
//! The pipeline writes two kinds of artifacts: one evidence note per paper
//! (named after its citekey) and one aggregate claims note. Where they end
//! up is the store's business.

use async_trait::async_trait;

use crate::error::StoreResult;

/// Destination for rendered Markdown notes.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Create whatever the store needs before the first write.
    ///
    /// Called once, after the table has been validated and before any row
    /// is processed. Failure aborts the run.
    async fn prepare(&self) -> StoreResult<()>;

    /// Write (or overwrite) the evidence note for `citekey`.
    ///
    /// Returns the location the note was written to, for reporting.
    async fn write_evidence(&self, citekey: &str, body: &str) -> StoreResult<String>;

    /// Write (or overwrite) the aggregate claims note.
    async fn write_claims(&self, file_name: &str, body: &str) -> StoreResult<String>;

    /// Link prefix under which evidence notes are addressable from the
    /// claims note (e.g. `evidence` for `[[evidence/@key#evd-001]]`).
    fn evidence_link_prefix(&self) -> &str;
}
