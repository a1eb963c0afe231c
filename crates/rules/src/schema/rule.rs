//! Rule definition as stored in rule files and the built-in library.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sysgraph_core::Severity;

use super::{Action, Condition};

/// An immutable diagnosis rule.
///
/// All conditions must match (logical AND) for the actions to run. Updates
/// replace the whole rule; nothing mutates a loaded rule in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rule {
    pub rule_id: String,
    pub name: String,
    /// Free-form tag such as `hardware`, `system` or `network`.
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub severity: Severity,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Base confidence in `[0, 1]`.
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_author")]
    pub author: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

pub(crate) fn default_true() -> bool {
    true
}

pub(crate) fn default_confidence() -> f64 {
    0.8
}

fn default_version() -> String {
    "1.0.0".to_string()
}

fn default_author() -> String {
    "system".to_string()
}

impl Rule {
    /// A rule with no conditions or actions and default metadata.
    pub fn new(
        rule_id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        severity: Severity,
    ) -> Self {
        let now = Utc::now();
        Self {
            rule_id: rule_id.into(),
            name: name.into(),
            category: category.into(),
            description: String::new(),
            severity,
            conditions: Vec::new(),
            actions: Vec::new(),
            enabled: true,
            confidence: default_confidence(),
            version: default_version(),
            author: default_author(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}
