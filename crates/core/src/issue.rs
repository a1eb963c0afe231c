use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How serious a diagnosed problem is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            other => Err(format!("unknown severity: '{}'", other)),
        }
    }
}

/// A diagnosed problem produced when a rule fires.
///
/// Only the rule engine's action executor creates these; callers own them
/// afterwards (summaries, persistence, display).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisIssue {
    /// `{rule_id}_{YYYYMMDD_HHMMSS}` of the execution time.
    pub issue_id: String,
    pub category: String,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub recommendation: String,
    /// In `[0, 1]`.
    pub confidence: f64,
    pub evidence: Vec<String>,
    pub timestamp: DateTime<Utc>,
}
