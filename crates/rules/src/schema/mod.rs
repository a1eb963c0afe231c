//! Rule schema types with serde deserialization.
//!
//! Defines the shapes found in rule files (JSON or YAML):
//! - `Rule`: id, category, severity, AND-ed conditions, actions, confidence
//! - `Condition` + `Operator`: one field-path test from the closed operator set
//! - `Action`: `create_issue`, `log`, or an unrecognized no-op
//! - `RuleExecutionResult`: per-rule outcome of an orchestration run

mod action;
mod condition;
mod result;
mod rule;

pub use action::*;
pub use condition::*;
pub use result::*;
pub use rule::*;

#[cfg(test)]
mod tests;
