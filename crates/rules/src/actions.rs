//! Action execution for matched rules.
//!
//! Actions run in declaration order. `create_issue` produces exactly one
//! [`DiagnosisIssue`]; `log` only emits a tracing event; unrecognized action
//! types are recorded as no-ops. No action can abort its rule.

use chrono::{DateTime, Utc};
use sysgraph_core::DiagnosisIssue;
use tracing::{error, info, warn};

use crate::schema::{Action, LogLevel, Rule};

/// Issues created and a human-readable record of every action run.
#[derive(Debug, Clone, Default)]
pub struct ActionOutcome {
    pub issues: Vec<DiagnosisIssue>,
    pub actions_taken: Vec<String>,
}

/// Runs the actions of matched rules.
pub struct ActionExecutor;

impl ActionExecutor {
    /// Execute all of `rule`'s actions for one match at time `now`.
    pub fn execute(rule: &Rule, evidence: &[String], now: DateTime<Utc>) -> ActionOutcome {
        let mut outcome = ActionOutcome::default();
        for action in &rule.actions {
            let (description, issue) = Self::execute_action(action, rule, evidence, now);
            outcome.actions_taken.push(description);
            outcome.issues.extend(issue);
        }
        outcome
    }

    fn execute_action(
        action: &Action,
        rule: &Rule,
        evidence: &[String],
        now: DateTime<Utc>,
    ) -> (String, Option<DiagnosisIssue>) {
        match action {
            Action::CreateIssue {
                severity,
                message,
                recommendation,
            } => {
                let issue = DiagnosisIssue {
                    issue_id: format!("{}_{}", rule.rule_id, now.format("%Y%m%d_%H%M%S")),
                    category: rule.category.clone(),
                    severity: severity.unwrap_or(rule.severity),
                    title: rule.name.clone(),
                    description: message.clone().unwrap_or_else(|| rule.description.clone()),
                    recommendation: recommendation
                        .clone()
                        .unwrap_or_else(|| format!("Check {} related configuration", rule.category)),
                    confidence: rule.confidence,
                    evidence: evidence.to_vec(),
                    timestamp: now,
                };
                (format!("create issue: {}", rule.name), Some(issue))
            }
            Action::Log { level, message } => {
                let message = message
                    .clone()
                    .unwrap_or_else(|| format!("rule {} triggered", rule.name));
                match level {
                    LogLevel::Error => error!(rule_id = %rule.rule_id, "{}", message),
                    LogLevel::Warning => warn!(rule_id = %rule.rule_id, "{}", message),
                    LogLevel::Info => info!(rule_id = %rule.rule_id, "{}", message),
                }
                (format!("log: {}", message), None)
            }
            Action::Unknown { kind } => {
                warn!(rule_id = %rule.rule_id, action = %kind, "unknown action type, skipping");
                (format!("unknown action type: {}", kind), None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sysgraph_core::Severity;

    fn rule() -> Rule {
        Rule::new("hw_cpu_high_usage", "CPU usage high", "hardware", Severity::High)
            .with_description("CPU usage above 90%")
            .with_confidence(0.75)
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap()
    }

    #[test]
    fn create_issue_uses_rule_fields_and_base_confidence() {
        let rule = rule().with_action(Action::create_issue(Severity::Critical, "CPU pegged"));
        let evidence = vec!["hardware.cpu.usage_percent > 90: matched".to_string()];

        let outcome = ActionExecutor::execute(&rule, &evidence, at());
        assert_eq!(outcome.issues.len(), 1);
        assert_eq!(outcome.actions_taken, vec!["create issue: CPU usage high"]);

        let issue = &outcome.issues[0];
        assert_eq!(issue.issue_id, "hw_cpu_high_usage_20260304_050607");
        assert_eq!(issue.severity, Severity::Critical);
        assert_eq!(issue.title, "CPU usage high");
        assert_eq!(issue.description, "CPU pegged");
        assert_eq!(issue.recommendation, "Check hardware related configuration");
        assert_eq!(issue.confidence, 0.75);
        assert_eq!(issue.evidence, evidence);
        assert_eq!(issue.timestamp, at());
    }

    #[test]
    fn create_issue_falls_back_to_rule_defaults() {
        let rule = rule().with_action(Action::CreateIssue {
            severity: None,
            message: None,
            recommendation: Some("Close some programs".into()),
        });
        let outcome = ActionExecutor::execute(&rule, &[], at());
        let issue = &outcome.issues[0];
        assert_eq!(issue.severity, Severity::High);
        assert_eq!(issue.description, "CPU usage above 90%");
        assert_eq!(issue.recommendation, "Close some programs");
    }

    #[test]
    fn log_and_unknown_actions_produce_no_issues() {
        let rule = rule()
            .with_action(Action::Log {
                level: LogLevel::Warning,
                message: None,
            })
            .with_action(Action::Unknown {
                kind: "reboot".into(),
            })
            .with_action(Action::create_issue(Severity::High, "CPU pegged"));

        let outcome = ActionExecutor::execute(&rule, &[], at());
        assert_eq!(
            outcome.actions_taken,
            vec![
                "log: rule CPU usage high triggered",
                "unknown action type: reboot",
                "create issue: CPU usage high",
            ]
        );
        assert_eq!(outcome.issues.len(), 1);
    }
}
