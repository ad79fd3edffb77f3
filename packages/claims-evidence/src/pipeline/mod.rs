//! The extraction pipeline.
//!
//! - Column resolution (headers -> canonical fields)
//! - Citekey generation
//! - Per-row evidence extraction
//! - Cross-paper claim synthesis with reference checking
//! - Note rendering
//! - Orchestration (sequencing, collisions, summary)

pub mod citekey;
pub mod columns;
pub mod extract;
pub mod orchestrator;
pub mod prompts;
pub mod render;
pub mod response;
pub mod synthesize;

pub use citekey::{abbreviate_question, generate_citekey};
pub use columns::{
    load_table, normalize_header, resolve_columns, resolve_records, ColumnMap, ResolvedTable, Table,
};
pub use extract::{extract_evidence, parse_evidence_items, try_extract_evidence};
pub use orchestrator::{claims_file_name, Pipeline, CENTRAL_CLAIMS_FILE};
pub use prompts::{
    format_evidence_summary, format_extract_prompt, format_synthesize_prompt, EXTRACT_PROMPT,
    SYNTHESIZE_PROMPT,
};
pub use render::{
    parse_evidence_anchors, render_claims_note, render_claims_note_with_prefix,
    render_evidence_note, DEFAULT_EVIDENCE_LINK_PREFIX,
};
pub use response::extract_json_array;
pub use synthesize::{
    check_references, normalize_citekey, parse_claims, synthesize_claims, try_synthesize_claims,
};
