//! Error types and load result structures for the rule loader.

use std::path::PathBuf;

/// Errors that can occur while loading a single rule file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Filesystem I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parse/deserialization error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parse/deserialization error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Document is neither a list of rules nor an object with a `rules` list.
    #[error("unsupported rule file shape: {0}")]
    Shape(String),

    /// Rule validation error (empty id, confidence out of range).
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result alias for loader operations.
pub type Result<T> = std::result::Result<T, LoadError>;

/// Outcome of loading a single rule file.
#[derive(Debug, Clone)]
pub struct LoadResult {
    /// Path to the file that was loaded.
    pub path: PathBuf,
    /// Status of the load attempt.
    pub status: LoadStatus,
}

/// Status of a single file load attempt.
#[derive(Debug, Clone)]
pub enum LoadStatus {
    /// File parsed; these rule ids were loaded from it.
    Loaded { rule_ids: Vec<String> },
    /// File was skipped (dotfile, unsupported extension, etc.).
    Skipped { reason: String },
    /// Parse or validation error occurred; the file contributed no rules.
    Failed { error: String },
}

impl LoadStatus {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadStatus::Loaded { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, LoadStatus::Failed { .. })
    }
}
