//! Prompts for evidence extraction and claim synthesis.

use crate::types::evidence::PaperEvidenceSet;
use crate::types::record::InputRecord;
use crate::types::scope::{ExtractionScope, EVIDENCE_TYPE};

/// Prompt for extracting evidence items from one paper.
pub const EXTRACT_PROMPT: &str = r#"Given the following paper data, extract 3-8 discrete empirical evidence items
that address the research question.

Paper: {title}
Authors: {authors}
Year: {year}

Research Question Context: {question}

{evidence_definition}
{content}

For each evidence item, provide:
1. A clear statement of the empirical finding/result
2. Three notes organized as:
   - What: Observable measures/data collected (e.g., accuracy metrics, performance scores)
   - How: Procedures/analyses/experimental design (e.g., prompting approaches, evaluation methods)
   - Who: Participants/dataset/population (e.g., dataset details, model types tested)

Return your response as a JSON array where each item has:
{
  "evidence": "The main evidence statement",
  "what": "What was measured/collected",
  "how": "How it was measured/analyzed",
  "who": "Who/what dataset was used"
}

Focus on discrete empirical results that could support or oppose broader claims.
Include specific metrics, comparisons, and statistical evidence when available.
If the text does not state a methodological detail, write "Not specified in abstract"
for that field instead of guessing.
Return an empty array if the paper reports no empirical findings."#;

/// Prompt for synthesizing claims across all extracted evidence.
pub const SYNTHESIZE_PROMPT: &str = r#"Given the following evidence extracted from multiple papers, synthesize 5-15 high-level candidate claims.

Research Question: {question}

{evidence}

For each claim, identify which evidence items support it. Return as a JSON array where each item has:
{
  "claim": "The synthesized claim statement",
  "supporting_evidence": [
    {"citekey": "@citekey", "evidence_id": "evd-001"},
    {"citekey": "@citekey", "evidence_id": "evd-002"}
  ]
}

Use the citekeys and evidence ids exactly as they appear above.
{relations_section}
Generate claims that:
- Identify patterns across multiple papers
- Compare approaches, systems or populations
- Address methodological patterns (e.g., study designs, evaluation approaches)
- Note performance factors and moderators
- Highlight contradictions or nuances when present

Each claim should be supported by at least one evidence item."#;

/// Format the extraction prompt for one record.
pub fn format_extract_prompt(
    record: &InputRecord,
    question: &str,
    scope: &ExtractionScope,
) -> String {
    let content = if record.has_content() {
        format!("Abstract:\n{}", record.abstract_text)
    } else {
        "Abstract:\n(No abstract available; rely on the title only)".to_string()
    };

    let evidence_definition = scope
        .node_types()
        .iter()
        .find(|nt| nt.name == EVIDENCE_TYPE)
        .and_then(|nt| nt.description.as_deref())
        .map(|d| format!("An evidence item is: {d}\n"))
        .unwrap_or_default();

    fill_template(
        EXTRACT_PROMPT,
        &[
            ("title", record.title.as_str()),
            ("authors", record.authors_display()),
            ("year", record.year_display()),
            ("question", question),
            ("evidence_definition", evidence_definition.as_str()),
            ("content", content.as_str()),
        ],
    )
}

/// Render the evidence corpus as the synthesis prompt sees it.
pub fn format_evidence_summary(papers: &[PaperEvidenceSet]) -> String {
    let mut summary = String::from("# All Extracted Evidence\n");

    for paper in papers {
        summary.push_str(&format!(
            "\n## From: {} ({})\n\n",
            paper.metadata.title, paper.citekey
        ));
        for (id, item) in paper.evidence() {
            summary.push_str(&format!("- [{id}] {}\n", item.statement));
            summary.push_str(&format!("  - What: {}\n", item.what));
            summary.push_str(&format!("  - How: {}\n", item.how));
            summary.push_str(&format!("  - Who: {}\n", item.who));
        }
    }

    summary
}

/// Format the synthesis prompt over the whole corpus.
pub fn format_synthesize_prompt(
    papers: &[PaperEvidenceSet],
    question: &str,
    scope: &ExtractionScope,
) -> String {
    let patterns = scope.relation_patterns();
    let relations_section = if patterns.is_empty() {
        String::new()
    } else {
        format!(
            "Valid node-to-node relation patterns:\n{}\n",
            patterns
                .iter()
                .map(|p| format!("- {p}"))
                .collect::<Vec<_>>()
                .join("\n")
        )
    };

    let evidence = format_evidence_summary(papers);
    fill_template(
        SYNTHESIZE_PROMPT,
        &[
            ("question", question),
            ("relations_section", relations_section.as_str()),
            ("evidence", evidence.as_str()),
        ],
    )
}

/// Substitute `{name}` placeholders in one pass over the template, so
/// braces inside substituted text are left alone.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        let hit = values.iter().find_map(|(name, value)| {
            let matches =
                tail[1..].starts_with(*name) && tail[1 + name.len()..].starts_with('}');
            matches.then_some((name.len() + 2, *value))
        });

        match hit {
            Some((len, value)) => {
                out.push_str(value);
                rest = &tail[len..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}
