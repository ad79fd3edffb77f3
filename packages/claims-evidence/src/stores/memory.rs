//! In-memory note store for testing.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::pipeline::render::DEFAULT_EVIDENCE_LINK_PREFIX;
use crate::traits::store::NoteStore;

/// Keeps the last body written under each name.
///
/// Overwrites are observable through [`MemoryNoteStore::evidence_writes`].
#[derive(Default)]
pub struct MemoryNoteStore {
    evidence: RwLock<BTreeMap<String, String>>,
    claims: RwLock<BTreeMap<String, String>>,
    evidence_writes: RwLock<usize>,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evidence note body for `citekey`.
    pub fn evidence(&self, citekey: &str) -> Option<String> {
        self.evidence
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(citekey)
            .cloned()
    }

    /// Citekeys with a stored evidence note, sorted.
    pub fn evidence_names(&self) -> Vec<String> {
        self.evidence
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Total evidence writes, overwrites included.
    pub fn evidence_writes(&self) -> usize {
        *self.evidence_writes.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claims note body stored under `file_name`.
    pub fn claims(&self, file_name: &str) -> Option<String> {
        self.claims
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(file_name)
            .cloned()
    }

    pub fn claims_names(&self) -> Vec<String> {
        self.claims
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }
}

#[async_trait]
impl NoteStore for MemoryNoteStore {
    async fn prepare(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn write_evidence(&self, citekey: &str, body: &str) -> StoreResult<String> {
        self.evidence
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(citekey.to_string(), body.to_string());
        *self.evidence_writes.write().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(format!("{DEFAULT_EVIDENCE_LINK_PREFIX}/{citekey}.md"))
    }

    async fn write_claims(&self, file_name: &str, body: &str) -> StoreResult<String> {
        self.claims
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(file_name.to_string(), body.to_string());
        Ok(format!("claims/{file_name}"))
    }

    fn evidence_link_prefix(&self) -> &str {
        DEFAULT_EVIDENCE_LINK_PREFIX
    }
}
