//! Run configuration for the pipeline.

use serde::{Deserialize, Serialize};

use super::scope::ExtractionScope;

/// What to do when two rows produce the same citekey.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Later row replaces the earlier note; references resolve to the later
    /// paper. A warning is logged for every collision.
    #[default]
    Overwrite,

    /// Later rows get `b`, `c`, ... appended to the citekey, in row order.
    Suffix,
}

/// How the aggregate claims note is named.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimsFileName {
    /// Always `central-claims.md`.
    #[default]
    Central,

    /// `synthesis-<abbreviated question>.md`, one file per question.
    #[serde(rename = "question")]
    PerQuestion,
}

/// Configuration for a pipeline run.
///
/// Immutable once handed to [`crate::Pipeline`]; the scope in particular is
/// threaded explicitly into extraction, synthesis and rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Output budget for each per-row extraction call.
    ///
    /// Default: 4000.
    pub extract_max_tokens: u32,

    /// Output budget for the single synthesis call.
    ///
    /// Default: 8000.
    pub synthesis_max_tokens: u32,

    /// Extraction calls allowed in flight at once.
    ///
    /// Default: 1 (strictly sequential).
    pub concurrency: usize,

    pub collision_policy: CollisionPolicy,

    pub claims_file: ClaimsFileName,

    pub scope: ExtractionScope,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            extract_max_tokens: 4000,
            synthesis_max_tokens: 8000,
            concurrency: 1,
            collision_policy: CollisionPolicy::default(),
            claims_file: ClaimsFileName::default(),
            scope: ExtractionScope::default(),
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extract_max_tokens(mut self, tokens: u32) -> Self {
        self.extract_max_tokens = tokens;
        self
    }

    pub fn with_synthesis_max_tokens(mut self, tokens: u32) -> Self {
        self.synthesis_max_tokens = tokens;
        self
    }

    /// Set extraction concurrency. Values below 1 are clamped to 1.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collision_policy = policy;
        self
    }

    pub fn with_claims_file(mut self, naming: ClaimsFileName) -> Self {
        self.claims_file = naming;
        self
    }

    pub fn with_scope(mut self, scope: ExtractionScope) -> Self {
        self.scope = scope;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::new();
        assert_eq!(config.extract_max_tokens, 4000);
        assert_eq!(config.synthesis_max_tokens, 8000);
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.collision_policy, CollisionPolicy::Overwrite);
        assert_eq!(config.claims_file, ClaimsFileName::Central);
    }

    #[test]
    fn test_concurrency_clamped() {
        let config = PipelineConfig::new().with_concurrency(0);
        assert_eq!(config.concurrency, 1);
    }
}
