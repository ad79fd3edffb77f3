//! Synthesized claims and their links back to evidence.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A cross-paper statement backed by evidence items.
///
/// References are kept exactly as the model named them; they are checked
/// against the corpus by [`crate::pipeline::synthesize::check_references`]
/// but never rewritten or dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    pub statement: String,
    pub supporting_evidence: Vec<EvidenceRef>,
}

impl Claim {
    pub fn new(statement: impl Into<String>) -> Self {
        Self {
            statement: statement.into(),
            supporting_evidence: Vec::new(),
        }
    }

    pub fn with_reference(
        mut self,
        citekey: impl Into<String>,
        evidence_id: impl Into<String>,
    ) -> Self {
        self.supporting_evidence
            .push(EvidenceRef::new(citekey, evidence_id));
        self
    }
}

/// A `(citekey, evidenceId)` pair naming one evidence item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceRef {
    pub citekey: String,
    pub evidence_id: String,
}

impl EvidenceRef {
    pub fn new(citekey: impl Into<String>, evidence_id: impl Into<String>) -> Self {
        Self {
            citekey: citekey.into(),
            evidence_id: evidence_id.into(),
        }
    }

    /// Missing its citekey or its evidence id.
    pub fn is_incomplete(&self) -> bool {
        self.citekey.is_empty() || self.evidence_id.is_empty()
    }
}

impl fmt::Display for EvidenceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.citekey, self.evidence_id)
    }
}

/// Why a reference did not resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnresolvedReason {
    /// No paper in the corpus has this citekey
    UnknownCitekey,

    /// The paper exists but has no item with this id
    UnknownEvidenceId,

    /// The model left out the citekey or the evidence id
    Malformed,
}

/// A dangling reference found in a claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnresolvedReference {
    /// Index of the claim in the synthesized list
    pub claim_index: usize,
    pub reference: EvidenceRef,
    pub reason: UnresolvedReason,
}

/// Outcome of checking every claim reference against the corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceCheck {
    pub resolved: usize,
    pub unresolved: Vec<UnresolvedReference>,
}

impl ReferenceCheck {
    pub fn unresolved_count(&self) -> usize {
        self.unresolved.len()
    }

    pub fn is_clean(&self) -> bool {
        self.unresolved.is_empty()
    }
}
