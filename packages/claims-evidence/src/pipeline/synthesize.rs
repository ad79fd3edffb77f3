//! Cross-paper claim synthesis and reference checking.

use std::collections::HashMap;
use std::time::Instant;

use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use super::prompts::format_synthesize_prompt;
use super::response::extract_json_array;
use crate::error::{ModelError, ModelResult};
use crate::traits::model::LanguageModel;
use crate::types::claim::{
    Claim, EvidenceRef, ReferenceCheck, UnresolvedReason, UnresolvedReference,
};
use crate::types::evidence::{EvidenceId, PaperEvidenceSet};
use crate::types::scope::ExtractionScope;

const CLAIM_KEYS: &[&str] = &["claim", "statement"];
const SUPPORT_KEYS: &[&str] = &["supporting_evidence", "supportingEvidence", "evidence"];
const CITEKEY_KEYS: &[&str] = &["citekey", "paper_file", "paperFile", "paper"];
const EVIDENCE_ID_KEYS: &[&str] = &["evidence_id", "evidenceId", "id"];

/// Synthesize claims over the whole corpus in one model call.
///
/// An empty corpus returns `Ok(vec![])` without calling the model.
pub async fn try_synthesize_claims<M: LanguageModel + ?Sized>(
    model: &M,
    papers: &[PaperEvidenceSet],
    question: &str,
    scope: &ExtractionScope,
    max_output_tokens: u32,
) -> ModelResult<Vec<Claim>> {
    if papers.is_empty() {
        info!("no evidence collected, skipping claim synthesis");
        return Ok(Vec::new());
    }

    let prompt = format_synthesize_prompt(papers, question, scope);
    debug!(papers = papers.len(), prompt_chars = prompt.len(), "synthesizing claims");

    let start = Instant::now();
    let response = model.submit(&prompt, max_output_tokens).await?;
    debug!(
        model = model.name(),
        duration_ms = start.elapsed().as_millis() as u64,
        "synthesis call finished"
    );

    let values = extract_json_array(&response)
        .ok_or_else(|| ModelError::Parse("no JSON array in synthesis response".into()))?;

    Ok(parse_claims(&values))
}

/// Fail-open wrapper: errors are logged and yield no claims.
pub async fn synthesize_claims<M: LanguageModel + ?Sized>(
    model: &M,
    papers: &[PaperEvidenceSet],
    question: &str,
    scope: &ExtractionScope,
    max_output_tokens: u32,
) -> Vec<Claim> {
    match try_synthesize_claims(model, papers, question, scope, max_output_tokens).await {
        Ok(claims) => claims,
        Err(ModelError::Parse(reason)) => {
            warn!("could not parse synthesized claims: {}", reason);
            Vec::new()
        }
        Err(e) => {
            error!(error = %e, "claim synthesis failed");
            Vec::new()
        }
    }
}

/// Convert raw JSON values to claims. Entries without a statement are
/// dropped; references are kept even when they do not resolve or are
/// missing a part, so they stay visible in the claims note.
pub fn parse_claims(values: &[Value]) -> Vec<Claim> {
    values
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|map| {
            let statement = string_field(map, CLAIM_KEYS)?;
            let supporting_evidence = SUPPORT_KEYS
                .iter()
                .find_map(|k| map.get(*k).and_then(Value::as_array))
                .map(|refs| refs.iter().map(parse_reference).collect())
                .unwrap_or_default();

            Some(Claim {
                statement,
                supporting_evidence,
            })
        })
        .collect()
}

/// Objects use the citekey/id aliases, strings the `@key#evd-001` link form.
/// Missing parts become empty strings; anything else is kept verbatim as
/// the id.
fn parse_reference(value: &Value) -> EvidenceRef {
    match value {
        Value::Object(map) => {
            let citekey = scalar_field(map, CITEKEY_KEYS)
                .map(|c| normalize_citekey(&c))
                .unwrap_or_default();
            let evidence_id = scalar_field(map, EVIDENCE_ID_KEYS).unwrap_or_default();
            EvidenceRef::new(citekey, evidence_id)
        }
        Value::String(link) => {
            let (citekey, evidence_id) = link.split_once('#').unwrap_or((link, ""));
            EvidenceRef::new(normalize_citekey(citekey), evidence_id.trim())
        }
        other => EvidenceRef::new("", other.to_string()),
    }
}

/// Like [`string_field`], but numbers count too (`"evidence_id": 1`).
fn scalar_field(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match map.get(*k)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn string_field(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| map.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Strip a note path down to its citekey: `evidence/@x.md` -> `@x`.
pub fn normalize_citekey(raw: &str) -> String {
    let key = raw.trim();
    let key = key.rsplit('/').next().unwrap_or(key);
    key.strip_suffix(".md").unwrap_or(key).to_string()
}

/// Check every claim reference against the corpus.
///
/// When two papers share a citekey the later one wins, matching what is on
/// disk after an overwrite.
pub fn check_references(claims: &[Claim], papers: &[PaperEvidenceSet]) -> ReferenceCheck {
    let by_citekey: HashMap<&str, &PaperEvidenceSet> =
        papers.iter().map(|p| (p.citekey.as_str(), p)).collect();

    let mut check = ReferenceCheck::default();

    for (claim_index, claim) in claims.iter().enumerate() {
        for reference in &claim.supporting_evidence {
            let reason = if reference.is_incomplete() {
                Some(UnresolvedReason::Malformed)
            } else {
                match by_citekey.get(reference.citekey.as_str()) {
                    None => Some(UnresolvedReason::UnknownCitekey),
                    Some(paper) => match reference.evidence_id.parse::<EvidenceId>() {
                        Ok(id) if paper.get(id).is_some() => None,
                        _ => Some(UnresolvedReason::UnknownEvidenceId),
                    },
                }
            };

            match reason {
                None => check.resolved += 1,
                Some(reason) => {
                    warn!(
                        claim = claim_index,
                        reference = %reference,
                        ?reason,
                        "unresolved evidence reference"
                    );
                    check.unresolved.push(UnresolvedReference {
                        claim_index,
                        reference: reference.clone(),
                        reason,
                    });
                }
            }
        }
    }

    check
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockModel;
    use crate::types::evidence::EvidenceItem;
    use crate::types::record::{InputRecord, PaperMetadata};
    use serde_json::json;

    fn paper(citekey: &str, items: usize) -> PaperEvidenceSet {
        let metadata = PaperMetadata::from(&InputRecord::new(1, citekey));
        let items = (0..items)
            .map(|i| EvidenceItem::new(format!("finding {i}"), "w", "h", "p"))
            .collect();
        PaperEvidenceSet::new(citekey, metadata, items).unwrap()
    }

    #[test]
    fn test_parse_claims_with_aliases() {
        let values = vec![
            json!({
                "claim": "Larger models entail better",
                "supporting_evidence": [
                    {"paper_file": "@smith2021.md", "evidence_id": "evd-001"},
                    {"citekey": "evidence/@doe2020", "evidenceId": "evd-002"},
                    {"citekey": "@missingId"},
                    {"citekey": "@num", "evidence_id": 1},
                    "@linked#evd-003",
                    7
                ]
            }),
            json!({"statement": "No refs"}),
            json!({"supporting_evidence": []}),
            json!("not an object"),
        ];
        let claims = parse_claims(&values);

        assert_eq!(claims.len(), 2);
        assert_eq!(
            claims[0].supporting_evidence,
            vec![
                EvidenceRef::new("@smith2021", "evd-001"),
                EvidenceRef::new("@doe2020", "evd-002"),
                EvidenceRef::new("@missingId", ""),
                EvidenceRef::new("@num", "1"),
                EvidenceRef::new("@linked", "evd-003"),
                EvidenceRef::new("", "7"),
            ]
        );
        assert!(claims[1].supporting_evidence.is_empty());
    }

    #[test]
    fn test_check_references() {
        let papers = vec![paper("@a", 2), paper("@b", 1)];
        let claims = vec![
            Claim::new("one")
                .with_reference("@a", "evd-001")
                .with_reference("@a", "evd-002")
                .with_reference("@b", "evd-001"),
            Claim::new("two")
                .with_reference("@a", "evd-003")
                .with_reference("@zzz", "evd-001")
                .with_reference("@b", "garbage"),
        ];

        let check = check_references(&claims, &papers);

        assert_eq!(check.resolved, 3);
        assert_eq!(check.unresolved_count(), 3);
        assert_eq!(check.unresolved[0].claim_index, 1);
        assert_eq!(check.unresolved[0].reason, UnresolvedReason::UnknownEvidenceId);
        assert_eq!(check.unresolved[1].reason, UnresolvedReason::UnknownCitekey);
        assert_eq!(check.unresolved[2].reference, EvidenceRef::new("@b", "garbage"));
    }

    #[test]
    fn test_malformed_references_are_counted() {
        let values = vec![json!({
            "claim": "C",
            "supporting_evidence": [
                {"citekey": "@a", "evidence_id": 1},
                {"paper_file": "@ghost.md"}
            ]
        })];
        let claims = parse_claims(&values);
        let check = check_references(&claims, &[paper("@a", 1)]);

        assert_eq!(check.resolved, 0);
        assert_eq!(check.unresolved_count(), 2);
        assert_eq!(check.unresolved[0].reason, UnresolvedReason::UnknownEvidenceId);
        assert_eq!(check.unresolved[1].reason, UnresolvedReason::Malformed);
        assert_eq!(check.unresolved[1].reference, EvidenceRef::new("@ghost", ""));
    }

    #[test]
    fn test_later_duplicate_citekey_wins() {
        let papers = vec![paper("@dup", 3), paper("@dup", 1)];
        let claims = vec![Claim::new("c").with_reference("@dup", "evd-003")];
        assert_eq!(check_references(&claims, &papers).unresolved_count(), 1);
    }

    #[test]
    fn test_normalize_citekey() {
        assert_eq!(normalize_citekey("@x.md"), "@x");
        assert_eq!(normalize_citekey(" evidence/@x.md "), "@x");
        assert_eq!(normalize_citekey("@x"), "@x");
    }

    #[tokio::test]
    async fn test_empty_corpus_skips_model() {
        let model = MockModel::new().with_default_response("[]");
        let claims = synthesize_claims(&model, &[], "Q", &ExtractionScope::default(), 8000).await;
        assert!(claims.is_empty());
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_synthesis_failure_is_empty() {
        let model = MockModel::new().with_failure(ModelError::Network("reset".into()));
        let claims =
            synthesize_claims(&model, &[paper("@a", 1)], "Q", &ExtractionScope::default(), 8000).await;
        assert!(claims.is_empty());
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn test_synthesize_parses_reply() {
        let model = MockModel::new().with_default_response(
            r#"```json
[{"claim": "A holds", "supporting_evidence": [{"citekey": "@a", "evidence_id": "evd-001"}]}]
```"#,
        );
        let claims =
            synthesize_claims(&model, &[paper("@a", 1)], "Q", &ExtractionScope::default(), 8000).await;

        assert_eq!(claims, vec![Claim::new("A holds").with_reference("@a", "evd-001")]);
        assert_eq!(model.calls()[0].max_output_tokens, 8000);
    }
}
