//! Per-rule outcome of one orchestration run.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use sysgraph_core::DiagnosisIssue;

/// What happened when one rule ran against one snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct RuleExecutionResult {
    pub rule_id: String,
    pub matched: bool,
    /// Final confidence after boosting; always 0.0 when unmatched.
    pub confidence: f64,
    /// One line per condition, in declaration order.
    pub evidence: Vec<String>,
    pub actions_taken: Vec<String>,
    pub issues_found: Vec<DiagnosisIssue>,
    /// Wall time spent on the rule; serialized as fractional seconds.
    #[serde(serialize_with = "serialize_secs")]
    pub execution_time: Duration,
    pub timestamp: DateTime<Utc>,
    /// Set when the rule failed locally. Evidence then holds whatever the
    /// conditions produced before the failure, possibly nothing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RuleExecutionResult {
    /// Zero-confidence, unmatched result for a rule that failed to evaluate.
    pub fn failed(rule_id: impl Into<String>, error: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            rule_id: rule_id.into(),
            matched: false,
            confidence: 0.0,
            evidence: Vec::new(),
            actions_taken: Vec::new(),
            issues_found: Vec::new(),
            execution_time: elapsed,
            timestamp: Utc::now(),
            error: Some(error.into()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

fn serialize_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}
