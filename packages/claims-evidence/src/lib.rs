//! Claims and Evidence Extraction Library
//!
//! Turns a bibliography table into linked research notes in two stages:
//!
//! 1. **Extract**: one model call per row pulls discrete empirical evidence
//!    items (statement plus What/How/Who) out of the title and abstract, and
//!    each paper's items are written to an evidence note named after a
//!    deterministic citekey (`@smithDeepModels2021.md`), every bullet anchored
//!    `^evd-001`, `^evd-002`, ...
//! 2. **Synthesize**: one model call over the whole corpus produces
//!    cross-paper claims, each linked back to the evidence that supports it
//!    (`[[evidence/@smithDeepModels2021#evd-002]]`).
//!
//! Failures stay local: a row whose call fails or whose reply cannot be
//! parsed is skipped, and a failed synthesis still yields an (empty) claims
//! note. Only configuration problems abort a run.
//!
//! # Usage
//!
//! ```rust,ignore
//! use claims_evidence::{FsNoteStore, Pipeline, PipelineConfig};
//! use claims_evidence::testing::MockModel;
//!
//! let store = FsNoteStore::new("out");
//! let model = MockModel::new();
//! let pipeline = Pipeline::with_config(store, model, PipelineConfig::new().with_concurrency(4));
//!
//! let summary = pipeline.run_path("papers.csv", "How effective are LLMs at entailment?").await?;
//! println!("{} evidence files, {} claims", summary.evidence_files_written, summary.claims_synthesized);
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Core seams (LanguageModel, NoteStore)
//! - [`types`] - Records, evidence, claims, scope, config, summary
//! - [`pipeline`] - Column resolution, extraction, synthesis, rendering, orchestration
//! - [`stores`] - Note stores (FsNoteStore, MemoryNoteStore)
//! - [`ai`] - Model providers and the rate-limit wrapper
//! - [`security`] - Credential handling
//! - [`testing`] - Mock model for tests

pub mod ai;
pub mod error;
pub mod pipeline;
pub mod security;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{ModelError, PipelineError, StoreError};
pub use traits::{model::LanguageModel, store::NoteStore};
pub use types::{
    claim::{Claim, EvidenceRef, ReferenceCheck, UnresolvedReason, UnresolvedReference},
    config::{ClaimsFileName, CollisionPolicy, PipelineConfig},
    evidence::{EvidenceId, EvidenceItem, PaperEvidenceSet, NOT_SPECIFIED},
    record::{InputRecord, PaperMetadata},
    scope::{DiscourseSchema, ExtractionScope},
    summary::RunSummary,
};

// Re-export pipeline components
pub use pipeline::{
    // Orchestration
    Pipeline, CENTRAL_CLAIMS_FILE,
    // Table input
    load_table, resolve_records, ResolvedTable, Table,
    // Identifiers
    abbreviate_question, generate_citekey,
    // Model stages
    check_references, extract_evidence, extract_json_array, synthesize_claims,
    // Rendering
    parse_evidence_anchors, render_claims_note, render_evidence_note,
};

pub use ai::RateLimitedModel;

#[cfg(feature = "anthropic")]
pub use ai::AnthropicModel;

#[cfg(feature = "openai")]
pub use ai::OpenAiModel;

pub use security::{ExposeSecret, ModelCredentials, SecretString};
pub use stores::{FsNoteStore, MemoryNoteStore};
pub use testing::MockModel;
