//! Per-row evidence extraction.

use std::time::Instant;

use serde_json::Value;
use tracing::{debug, error, warn};

use super::prompts::format_extract_prompt;
use super::response::extract_json_array;
use crate::error::{ModelError, ModelResult};
use crate::traits::model::LanguageModel;
use crate::types::evidence::EvidenceItem;
use crate::types::record::InputRecord;
use crate::types::scope::ExtractionScope;

const STATEMENT_KEYS: &[&str] = &["evidence", "statement", "content"];

/// Extract evidence for one record, surfacing why nothing came back.
///
/// Returns `ModelError::Parse` when the reply holds no usable JSON array.
/// An array with no usable items is `Ok(vec![])`.
pub async fn try_extract_evidence<M: LanguageModel + ?Sized>(
    model: &M,
    record: &InputRecord,
    question: &str,
    scope: &ExtractionScope,
    max_output_tokens: u32,
) -> ModelResult<Vec<EvidenceItem>> {
    let prompt = format_extract_prompt(record, question, scope);
    debug!(row = record.row, prompt_chars = prompt.len(), "extracting evidence");

    let start = Instant::now();
    let response = model.submit(&prompt, max_output_tokens).await?;
    debug!(
        row = record.row,
        model = model.name(),
        duration_ms = start.elapsed().as_millis() as u64,
        "extraction call finished"
    );

    let values = extract_json_array(&response)
        .ok_or_else(|| ModelError::Parse("no JSON array in extraction response".into()))?;

    Ok(parse_evidence_items(&values))
}

/// Extract evidence for one record. Never fails: any error is logged and
/// yields an empty list, which the caller treats as a skipped row.
pub async fn extract_evidence<M: LanguageModel + ?Sized>(
    model: &M,
    record: &InputRecord,
    question: &str,
    scope: &ExtractionScope,
    max_output_tokens: u32,
) -> Vec<EvidenceItem> {
    match try_extract_evidence(model, record, question, scope, max_output_tokens).await {
        Ok(items) => items,
        Err(ModelError::Parse(reason)) => {
            warn!(row = record.row, title = %record.title, "could not parse evidence: {}", reason);
            Vec::new()
        }
        Err(e) => {
            error!(
                row = record.row,
                title = %record.title,
                error = %e,
                "evidence extraction failed"
            );
            Vec::new()
        }
    }
}

/// Convert raw JSON values to items, dropping entries without a statement.
pub fn parse_evidence_items(values: &[Value]) -> Vec<EvidenceItem> {
    values
        .iter()
        .filter_map(|value| {
            let (statement, what, how, who) = match value {
                Value::String(statement) => {
                    (statement.clone(), String::new(), String::new(), String::new())
                }
                Value::Object(map) => {
                    let field = |keys: &[&str]| {
                        keys.iter()
                            .find_map(|k| map.get(*k).and_then(text_of))
                            .unwrap_or_default()
                    };
                    (
                        field(STATEMENT_KEYS),
                        field(&["what"]),
                        field(&["how"]),
                        field(&["who"]),
                    )
                }
                _ => return None,
            };

            if statement.trim().is_empty() {
                debug!("dropping evidence entry without a statement");
                return None;
            }
            Some(EvidenceItem::new(statement, what, how, who))
        })
        .collect()
}

/// String content of a scalar JSON value.
fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockModel;
    use crate::types::evidence::NOT_SPECIFIED;
    use serde_json::json;

    fn record() -> InputRecord {
        InputRecord::new(1, "Deep Models").with_abstract("Accuracy rose to 90% on MNLI.")
    }

    #[test]
    fn test_parse_items_with_aliases() {
        let values = vec![
            json!({"evidence": "A", "what": "acc", "how": "eval", "who": "MNLI"}),
            json!({"statement": "B", "what": "f1"}),
            json!({"content": "C", "who": 3}),
            json!("D"),
            json!({"what": "no statement"}),
            json!({"evidence": "   "}),
            json!(42),
            json!({"evidence": NOT_SPECIFIED}),
        ];
        let items = parse_evidence_items(&values);

        let statements: Vec<&str> = items.iter().map(|i| i.statement.as_str()).collect();
        assert_eq!(statements, vec!["A", "B", "C", "D", NOT_SPECIFIED]);
        assert_eq!(items[1].how, NOT_SPECIFIED);
        assert_eq!(items[2].who, "3");
        assert_eq!(items[3].what, NOT_SPECIFIED);
    }

    #[tokio::test]
    async fn test_extract_wrapped_response() {
        let model = MockModel::new().with_default_response(
            r#"Sure! Here are the items: [{"evidence": "Accuracy rose", "what": "accuracy", "how": "benchmark", "who": "MNLI"}] Hope it helps."#,
        );

        let items = extract_evidence(&model, &record(), "Q", &ExtractionScope::default(), 4000).await;

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].statement, "Accuracy rose");
        let calls = model.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].max_output_tokens, 4000);
        assert!(calls[0].prompt.contains("Accuracy rose to 90% on MNLI."));
    }

    #[tokio::test]
    async fn test_citation_marker_in_prose() {
        let model = MockModel::new().with_default_response(
            r#"As reported in [1] and [2, 3], the findings are: [{"evidence": "Accuracy rose", "what": "accuracy"}]"#,
        );

        let items = extract_evidence(&model, &record(), "Q", &ExtractionScope::default(), 4000).await;

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].statement, "Accuracy rose");
        assert_eq!(items[0].how, NOT_SPECIFIED);
    }

    #[tokio::test]
    async fn test_unparseable_is_empty() {
        let model = MockModel::new().with_default_response("I cannot help with that.");
        let items = extract_evidence(&model, &record(), "Q", &ExtractionScope::default(), 4000).await;
        assert!(items.is_empty());

        let err = try_extract_evidence(&model, &record(), "Q", &ExtractionScope::default(), 4000)
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::Parse(_)));
    }

    #[tokio::test]
    async fn test_model_failure_is_empty() {
        let model = MockModel::new().with_failure(ModelError::RateLimited("slow down".into()));
        let items = extract_evidence(&model, &record(), "Q", &ExtractionScope::default(), 4000).await;
        assert!(items.is_empty());
    }
}
