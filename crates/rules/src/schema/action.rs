//! Actions run when every condition of a rule matches.

use serde::{Deserialize, Serialize};
use sysgraph_core::Severity;

/// A rule action, tagged by its `type` field.
///
/// Unrecognized types deserialize into [`Action::Unknown`] and execute as a
/// no-op, so a newer rule repository never breaks an older engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawAction", into = "RawAction")]
pub enum Action {
    CreateIssue {
        /// Overrides the rule severity when set.
        severity: Option<Severity>,
        message: Option<String>,
        recommendation: Option<String>,
    },
    Log {
        level: LogLevel,
        message: Option<String>,
    },
    Unknown {
        kind: String,
    },
}

impl Action {
    pub fn create_issue(severity: Severity, message: impl Into<String>) -> Self {
        Action::CreateIssue {
            severity: Some(severity),
            message: Some(message.into()),
            recommendation: None,
        }
    }

    /// The `type` tag as written in rule files.
    pub fn kind(&self) -> &str {
        match self {
            Action::CreateIssue { .. } => "create_issue",
            Action::Log { .. } => "log",
            Action::Unknown { kind } => kind,
        }
    }
}

/// Level for the `log` action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    #[default]
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
        }
    }
}

impl From<&str> for LogLevel {
    fn from(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "error" => LogLevel::Error,
            "warning" | "warn" => LogLevel::Warning,
            _ => LogLevel::Info,
        }
    }
}

/// Flat wire shape shared by every action type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RawAction {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    severity: Option<Severity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    recommendation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    level: Option<String>,
}

impl From<RawAction> for Action {
    fn from(raw: RawAction) -> Self {
        match raw.kind.as_str() {
            "create_issue" => Action::CreateIssue {
                severity: raw.severity,
                message: raw.message,
                recommendation: raw.recommendation,
            },
            "log" => Action::Log {
                level: raw.level.as_deref().map(LogLevel::from).unwrap_or_default(),
                message: raw.message,
            },
            _ => Action::Unknown { kind: raw.kind },
        }
    }
}

impl From<Action> for RawAction {
    fn from(action: Action) -> Self {
        match action {
            Action::CreateIssue {
                severity,
                message,
                recommendation,
            } => RawAction {
                kind: "create_issue".to_string(),
                severity,
                message,
                recommendation,
                level: None,
            },
            Action::Log { level, message } => RawAction {
                kind: "log".to_string(),
                message,
                level: Some(level.as_str().to_string()),
                ..Default::default()
            },
            Action::Unknown { kind } => RawAction {
                kind,
                ..Default::default()
            },
        }
    }
}
