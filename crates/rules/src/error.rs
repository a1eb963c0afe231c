//! Error types for path parsing, rule-local failures and remote sync.

use std::time::Duration;

/// A field path that cannot be resolved because it is malformed.
///
/// Missing keys are never errors (they resolve to `Absent`); only paths that
/// violate the path grammar end up here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("field path is empty")]
    Empty,

    #[error("field path '{0}' contains an empty segment")]
    EmptySegment(String),

    #[error("field path '{0}' contains more than one [*] wildcard")]
    MultipleWildcards(String),
}

/// A failure confined to a single rule's evaluation.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("condition {index} on '{field}': {source}")]
    Path {
        index: usize,
        field: String,
        #[source]
        source: PathError,
        /// Evidence from every condition of the rule, the malformed one included.
        evidence: Vec<String>,
    },

    #[error("evaluation panicked: {0}")]
    Panicked(String),
}

impl RuleError {
    /// Evidence recorded for the failed rule; empty after a panic.
    pub fn evidence(&self) -> &[String] {
        match self {
            RuleError::Path { evidence, .. } => evidence,
            RuleError::Panicked(_) => &[],
        }
    }
}

/// Errors raised while refreshing the remote rule cache.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with code {code}: {stderr}")]
    Command {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("`{command}` timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("rule loading task failed: {0}")]
    Join(String),
}

/// Result alias for sync operations.
pub type SyncResult<T> = std::result::Result<T, SyncError>;
