//! Typed errors for the claims/evidence pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can tell
//! fatal configuration problems apart from failures that stay local to a
//! single row or to the synthesis step.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a pipeline run.
///
/// Everything here is raised before any output is written, except
/// [`PipelineError::Store`] which can also surface mid-run when the output
/// directories disappear underneath us.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The source table could not be opened or decoded.
    #[error("cannot read table {path}: {source}")]
    TableRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The source table has no header row at all.
    #[error("table {path} has no header row")]
    EmptyTable { path: PathBuf },

    /// No header matched `title` case-insensitively.
    #[error("table must contain a 'Title' column (found: {})", found.join(", "))]
    MissingTitleColumn { found: Vec<String> },

    /// Type/relation selection could not be built.
    #[error("scope error: {0}")]
    Scope(String),

    /// Output store failed.
    #[error("note store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors from a language-model call.
///
/// These never abort a run once it has started; the extractor and the
/// synthesizer log them and carry on with an empty result.
#[derive(Debug, Clone, Error)]
pub enum ModelError {
    /// Configuration error (missing API key, invalid settings)
    #[error("configuration error: {0}")]
    Config(String),

    /// Network error (connection failed, timeout)
    #[error("network error: {0}")]
    Network(String),

    /// Provider asked us to slow down
    #[error("rate limited by provider: {0}")]
    RateLimited(String),

    /// API error (non-2xx response, quota, invalid request)
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Response body did not have the expected shape
    #[error("parse error: {0}")]
    Parse(String),

    /// Provider answered without any text
    #[error("empty response from {0}")]
    EmptyResponse(String),
}

/// Errors writing notes.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Result type alias for model calls.
pub type ModelResult<T> = std::result::Result<T, ModelError>;

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
