//! Rule evaluation engine for system diagnosis.
//!
//! This crate provides:
//! - A rule schema (JSON/YAML) with conditions over snapshot field paths
//! - A field resolver supporting one `[*]` wildcard per path
//! - Condition evaluation with per-condition audit evidence
//! - Actions that turn matched rules into [`DiagnosisIssue`](sysgraph_core::DiagnosisIssue)s
//! - A built-in rule library plus remote rules synchronized from a git repository
//! - A parallel orchestrator that isolates per-rule failures

pub mod actions;
pub mod builtin;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod loader;
pub mod resolver;
pub mod schema;
pub mod store;
pub mod sync;

pub use engine::{boost_confidence, RuleEngine, CONFIDENCE_BOOST};
pub use error::{PathError, RuleError, SyncError};
pub use schema::{Action, Condition, Operator, Rule, RuleExecutionResult};
pub use store::{RuleStatistics, RuleStore};
pub use sync::{GitFetcher, RemoteSynchronizer, RuleFetcher, SyncHandle, SyncReport};
