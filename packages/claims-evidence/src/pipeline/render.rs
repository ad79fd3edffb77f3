//! Markdown rendering of evidence and claims notes.
//!
//! Evidence bullets carry a block anchor (`^evd-001`) so claims can deep-link
//! to them with `[[evidence/@citekey#evd-001]]`.

use std::fmt::Write;

use crate::types::claim::Claim;
use crate::types::evidence::{EvidenceId, PaperEvidenceSet};
use crate::types::record::{NOT_AVAILABLE, UNKNOWN};
use crate::types::scope::ExtractionScope;

/// Link prefix used when the evidence store sits in `evidence/`.
pub const DEFAULT_EVIDENCE_LINK_PREFIX: &str = "evidence";

/// Render the note for one paper.
pub fn render_evidence_note(set: &PaperEvidenceSet, scope: &ExtractionScope) -> String {
    let meta = &set.metadata;
    let tag = tag_suffix(scope.evidence_tag());

    let mut note = format!(
        "# {}\n\n**Authors:** {}\n**Year:** {}\n**DOI:** {}\n**Citation Count:** {}\n\n## Evidence Items\n\n",
        one_line(&meta.title),
        one_line(meta.authors.as_deref().unwrap_or(UNKNOWN)),
        one_line(meta.year.as_deref().unwrap_or(UNKNOWN)),
        one_line(meta.doi.as_deref().unwrap_or(NOT_AVAILABLE)),
        one_line(meta.citation_count.as_deref().unwrap_or(NOT_AVAILABLE)),
    );

    for (id, item) in set.evidence() {
        let _ = writeln!(note, "- {}{tag} ^{id}", one_line(&item.statement));
        let _ = writeln!(note, "\t- **What**: {}", one_line(&item.what));
        let _ = writeln!(note, "\t- **How**: {}", one_line(&item.how));
        let _ = writeln!(note, "\t- **Who**: {}", one_line(&item.who));
    }

    note
}

/// Render the aggregate claims note with links under `evidence/`.
pub fn render_claims_note(question: &str, claims: &[Claim], scope: &ExtractionScope) -> String {
    render_claims_note_with_prefix(question, claims, scope, DEFAULT_EVIDENCE_LINK_PREFIX)
}

/// Render the aggregate claims note.
///
/// Every reference becomes a link, resolved or not, so dangling references
/// stay visible in the output.
pub fn render_claims_note_with_prefix(
    question: &str,
    claims: &[Claim],
    scope: &ExtractionScope,
    link_prefix: &str,
) -> String {
    let tag = tag_suffix(scope.claim_tag());
    let mut note = format!(
        "# Candidate Claims\n\nResearch Question: {}\n\n## Claims\n\n",
        one_line(question)
    );

    for claim in claims {
        let links: String = claim
            .supporting_evidence
            .iter()
            .map(|r| format!(" [[{link_prefix}/{}#{}]]", r.citekey, r.evidence_id))
            .collect();
        let _ = writeln!(note, "- {}{tag}{links}", one_line(&claim.statement));
    }

    note
}

/// Anchors of the evidence bullets in a rendered note, in order.
pub fn parse_evidence_anchors(note: &str) -> Vec<EvidenceId> {
    note.lines()
        .filter(|line| line.starts_with("- "))
        .filter_map(|line| line.rsplit_once(" ^"))
        .filter_map(|(_, anchor)| anchor.trim().parse().ok())
        .collect()
}

fn tag_suffix(tag: Option<&str>) -> String {
    tag.map(|t| format!(" #{t}")).unwrap_or_default()
}

/// Collapse internal newlines so a value stays on its bullet line.
fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
