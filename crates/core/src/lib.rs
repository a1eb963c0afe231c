pub mod config;
pub mod error;
pub mod issue;
pub mod snapshot;

pub use config::RuleEngineConfig;
pub use error::*;
pub use issue::{DiagnosisIssue, Severity};
pub use snapshot::Value;
