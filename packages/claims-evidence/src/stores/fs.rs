//! Filesystem note store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::pipeline::render::DEFAULT_EVIDENCE_LINK_PREFIX;
use crate::traits::store::NoteStore;

/// Writes evidence notes to one directory and the claims note to another.
///
/// Default layout under an output root:
///
/// ```text
/// <root>/evidence/@smithDeepModels2021.md
/// <root>/claims/central-claims.md
/// ```
#[derive(Debug, Clone)]
pub struct FsNoteStore {
    evidence_dir: PathBuf,
    claims_dir: PathBuf,
    link_prefix: String,
}

impl FsNoteStore {
    /// `evidence/` and `claims/` under `root`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self::with_dirs(root.join(DEFAULT_EVIDENCE_LINK_PREFIX), root.join("claims"))
    }

    /// Explicit directories. The link prefix is the evidence directory's
    /// final component.
    pub fn with_dirs(evidence_dir: impl Into<PathBuf>, claims_dir: impl Into<PathBuf>) -> Self {
        let evidence_dir = evidence_dir.into();
        let link_prefix = evidence_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_EVIDENCE_LINK_PREFIX.to_string());
        Self {
            evidence_dir,
            claims_dir: claims_dir.into(),
            link_prefix,
        }
    }

    async fn write(path: PathBuf, body: &str) -> StoreResult<String> {
        tokio::fs::write(&path, body)
            .await
            .map_err(|source| StoreError::Write {
                path: path.clone(),
                source,
            })?;
        debug!(path = %path.display(), bytes = body.len(), "wrote note");
        Ok(path.display().to_string())
    }
}

#[async_trait]
impl NoteStore for FsNoteStore {
    async fn prepare(&self) -> StoreResult<()> {
        for dir in [&self.evidence_dir, &self.claims_dir] {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| StoreError::CreateDir {
                    path: dir.clone(),
                    source,
                })?;
        }
        Ok(())
    }

    async fn write_evidence(&self, citekey: &str, body: &str) -> StoreResult<String> {
        Self::write(self.evidence_dir.join(format!("{citekey}.md")), body).await
    }

    async fn write_claims(&self, file_name: &str, body: &str) -> StoreResult<String> {
        Self::write(self.claims_dir.join(file_name), body).await
    }

    fn evidence_link_prefix(&self) -> &str {
        &self.link_prefix
    }
}
