//! The pipeline: table -> per-row extraction -> synthesis -> notes.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use futures::stream::{self, StreamExt};
use tracing::{error, info, warn};

use super::citekey::{abbreviate_question, generate_citekey};
use super::columns::{load_table, resolve_records, Table};
use super::extract::extract_evidence;
use super::render::{render_claims_note_with_prefix, render_evidence_note};
use super::synthesize::{check_references, synthesize_claims};
use crate::error::{PipelineError, Result};
use crate::traits::model::LanguageModel;
use crate::traits::store::NoteStore;
use crate::types::config::{ClaimsFileName, CollisionPolicy, PipelineConfig};
use crate::types::evidence::PaperEvidenceSet;
use crate::types::record::{InputRecord, PaperMetadata};
use crate::types::scope::EVIDENCE_TYPE;
use crate::types::summary::RunSummary;

/// Name of the claims note under [`ClaimsFileName::Central`].
pub const CENTRAL_CLAIMS_FILE: &str = "central-claims.md";

/// Runs the two-stage extract-then-synthesize pipeline.
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = Pipeline::new(FsNoteStore::new("out"), model);
/// let summary = pipeline.run_path("papers.csv", "How effective are LLMs at entailment?").await?;
/// println!("{} claims", summary.claims_synthesized);
/// ```
pub struct Pipeline<S: NoteStore, M: LanguageModel> {
    store: S,
    model: M,
    config: PipelineConfig,
}

impl<S: NoteStore, M: LanguageModel> Pipeline<S, M> {
    pub fn new(store: S, model: M) -> Self {
        Self {
            store,
            model,
            config: PipelineConfig::default(),
        }
    }

    pub fn with_config(store: S, model: M, config: PipelineConfig) -> Self {
        Self { store, model, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Load the table at `path` and run.
    pub async fn run_path(&self, path: impl AsRef<Path>, question: &str) -> Result<RunSummary> {
        let table = load_table(path)?;
        self.run(&table, question).await
    }

    /// Run over an already loaded table.
    ///
    /// Only configuration problems and an unusable store return `Err`.
    /// Row failures and synthesis failures are logged and counted.
    pub async fn run(&self, table: &Table, question: &str) -> Result<RunSummary> {
        let scope = &self.config.scope;
        if !scope.extracts_evidence() {
            return Err(PipelineError::Scope(format!(
                "'{EVIDENCE_TYPE}' must be among the selected node types"
            )));
        }

        let resolved = resolve_records(table)?;
        self.store.prepare().await?;

        let total = resolved.rows_total();
        let mut summary = RunSummary {
            rows_total: total,
            rows_skipped: resolved.skipped_rows.len(),
            ..RunSummary::default()
        };

        info!(rows = total, question, "starting evidence extraction");

        let mut corpus: Vec<PaperEvidenceSet> = Vec::new();
        let mut namer = CitekeyNamer::new(self.config.collision_policy);

        let mut results = stream::iter(&resolved.records)
            .map(|record| async move {
                info!(row = record.row, total, title = %record.title, "processing row");
                let items = extract_evidence(
                    &self.model,
                    record,
                    question,
                    scope,
                    self.config.extract_max_tokens,
                )
                .await;
                (record, items)
            })
            .buffered(self.config.concurrency.max(1));

        while let Some((record, items)) = results.next().await {
            if items.is_empty() {
                warn!(
                    row = record.row,
                    title = %record.title,
                    "no evidence extracted, skipping row"
                );
                summary.rows_skipped += 1;
                continue;
            }

            let (citekey, collided) = namer.assign(record);
            if collided {
                summary.citekey_collisions += 1;
            }

            let metadata = PaperMetadata::from(record);
            let Some(set) = PaperEvidenceSet::new(citekey, metadata, items) else {
                summary.rows_skipped += 1;
                continue;
            };

            let body = render_evidence_note(&set, scope);
            let location = match self.store.write_evidence(&set.citekey, &body).await {
                Ok(location) => location,
                Err(e) => {
                    error!(
                        row = record.row,
                        citekey = %set.citekey,
                        error = %e,
                        "failed to write evidence note"
                    );
                    summary.rows_skipped += 1;
                    continue;
                }
            };

            info!(
                row = record.row,
                citekey = %set.citekey,
                items = set.len(),
                "wrote evidence note"
            );
            summary.rows_processed += 1;
            if !summary.evidence_files.contains(&location) {
                summary.evidence_files.push(location);
            }

            // An overwritten note is replaced in place so references resolve
            // against what is on disk.
            match corpus.iter_mut().find(|p| p.citekey == set.citekey) {
                Some(existing) => *existing = set,
                None => corpus.push(set),
            }
        }

        summary.evidence_files_written = summary.evidence_files.len();
        summary.evidence_items = corpus.iter().map(PaperEvidenceSet::len).sum();

        info!(
            papers = corpus.len(),
            items = summary.evidence_items,
            skipped = summary.rows_skipped,
            "evidence extraction complete"
        );

        let claims = if scope.synthesizes_claims() {
            synthesize_claims(
                &self.model,
                &corpus,
                question,
                scope,
                self.config.synthesis_max_tokens,
            )
            .await
        } else {
            info!("Claim type not selected, skipping synthesis");
            Vec::new()
        };

        let check = check_references(&claims, &corpus);
        if !check.is_clean() {
            warn!(
                unresolved = check.unresolved_count(),
                resolved = check.resolved,
                "claims reference evidence missing from the corpus"
            );
        }
        summary.claims_synthesized = claims.len();
        summary.unresolved_references = check.unresolved;

        let file_name = claims_file_name(&self.config.claims_file, question);
        let body = render_claims_note_with_prefix(
            question,
            &claims,
            scope,
            self.store.evidence_link_prefix(),
        );
        let location = self.store.write_claims(&file_name, &body).await?;
        info!(claims = claims.len(), file = %location, "wrote claims note");
        summary.claims_file = Some(location);

        info!(
            rows = summary.rows_total,
            processed = summary.rows_processed,
            skipped = summary.rows_skipped,
            evidence_files = summary.evidence_files_written,
            claims = summary.claims_synthesized,
            collisions = summary.citekey_collisions,
            "pipeline complete"
        );

        Ok(summary)
    }
}

/// File name of the claims note for `question`.
pub fn claims_file_name(naming: &ClaimsFileName, question: &str) -> String {
    match naming {
        ClaimsFileName::Central => CENTRAL_CLAIMS_FILE.to_string(),
        ClaimsFileName::PerQuestion => format!("synthesis-{}.md", abbreviate_question(question)),
    }
}

/// Hands out citekeys in row order, applying the collision policy.
struct CitekeyNamer {
    policy: CollisionPolicy,
    taken: HashSet<String>,
    holders: HashMap<String, usize>,
}

impl CitekeyNamer {
    fn new(policy: CollisionPolicy) -> Self {
        Self {
            policy,
            taken: HashSet::new(),
            holders: HashMap::new(),
        }
    }

    /// Returns the citekey to use and whether the base key collided.
    fn assign(&mut self, record: &InputRecord) -> (String, bool) {
        let base = generate_citekey(
            record.authors.as_deref(),
            &record.title,
            record.year.as_deref(),
        );
        let seen = self.holders.entry(base.clone()).or_insert(0);
        *seen += 1;
        let collided = *seen > 1;

        let key = match self.policy {
            CollisionPolicy::Overwrite => {
                if collided {
                    warn!(
                        row = record.row,
                        citekey = %base,
                        "citekey collision, overwriting earlier note"
                    );
                }
                base
            }
            CollisionPolicy::Suffix => {
                let mut key = base.clone();
                let mut n = 0u32;
                while self.taken.contains(&key) {
                    key = format!("{base}{}", suffix(n));
                    n += 1;
                }
                if collided {
                    warn!(
                        row = record.row,
                        citekey = %base,
                        assigned = %key,
                        "citekey collision, suffixing"
                    );
                }
                key
            }
        };

        self.taken.insert(key.clone());
        (key, collided)
    }
}

/// `b`, `c`, ..., `z`, then `27`, `28`, ...
fn suffix(n: u32) -> String {
    match char::from_u32('b' as u32 + n) {
        Some(c) if c <= 'z' => c.to_string(),
        _ => (n + 2).to_string(),
    }
}
