use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use claims_evidence::{ClaimsFileName, CollisionPolicy};

/// Extract evidence from a bibliography table and synthesize linked claims.
#[derive(Debug, Parser)]
#[command(name = "claims-evidence", version, about)]
pub struct Cli {
    /// CSV export with a Title column (abstract-like column recommended)
    pub csv: PathBuf,

    /// Research question framing extraction and synthesis
    pub question: String,

    /// Discourse-graph schema JSON (nodeTypes, relationTypes, discourseRelations)
    #[arg(long)]
    pub schema: Option<PathBuf>,

    /// Node types to extract, by name
    #[arg(
        long = "node-types",
        num_args = 1..,
        default_values_t = [String::from("Evidence"), String::from("Claim")]
    )]
    pub node_types: Vec<String>,

    /// Root for the evidence/ and claims/ directories
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Evidence notes directory (default: <output-dir>/evidence)
    #[arg(long)]
    pub evidence_dir: Option<PathBuf>,

    /// Claims note directory (default: <output-dir>/claims)
    #[arg(long)]
    pub claims_dir: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Provider::Anthropic)]
    pub provider: Provider,

    /// Model name (overrides ANTHROPIC_MODEL / OPENAI_MODEL)
    #[arg(long)]
    pub model: Option<String>,

    #[arg(long, default_value_t = 4000)]
    pub extract_max_tokens: u32,

    #[arg(long, default_value_t = 8000)]
    pub synthesis_max_tokens: u32,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 120)]
    pub timeout_secs: u64,

    /// Extraction calls in flight at once (1 = sequential)
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
    pub concurrency: u16,

    /// Cap on model calls per minute (overrides CLAIMS_REQUESTS_PER_MINUTE)
    #[arg(long)]
    pub requests_per_minute: Option<u32>,

    #[arg(long, value_enum, default_value_t = OnCollision::Overwrite)]
    pub on_collision: OnCollision,

    #[arg(long, value_enum, default_value_t = ClaimsFile::Central)]
    pub claims_file: ClaimsFile,

    /// Print the run summary as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Debug logging for the pipeline
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Provider {
    Anthropic,
    Openai,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OnCollision {
    /// Later paper replaces the earlier note
    Overwrite,
    /// Later papers get b, c, ... appended
    Suffix,
}

impl From<OnCollision> for CollisionPolicy {
    fn from(value: OnCollision) -> Self {
        match value {
            OnCollision::Overwrite => CollisionPolicy::Overwrite,
            OnCollision::Suffix => CollisionPolicy::Suffix,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ClaimsFile {
    /// central-claims.md
    Central,
    /// synthesis-<question keywords>.md
    Question,
}

impl From<ClaimsFile> for ClaimsFileName {
    fn from(value: ClaimsFile) -> Self {
        match value {
            ClaimsFile::Central => ClaimsFileName::Central,
            ClaimsFile::Question => ClaimsFileName::PerQuestion,
        }
    }
}
