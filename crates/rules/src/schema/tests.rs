//! Tests for schema types.

use super::*;
use sysgraph_core::{Severity, Value};

const YAML_RULE: &str = r#"
rule_id: disk_io_wait
name: Disk IO wait high
category: hardware
description: IO wait above threshold
severity: medium
conditions:
  - field: hardware.cpu.iowait
    operator: ">="
    value: 25
  - field: network.interfaces
    operator: none_true
    field_check: is_up
actions:
  - type: create_issue
    severity: high
    message: IO wait is high
    recommendation: Check disk health
  - type: log
    level: warning
    message: io wait rule fired
  - type: send_pager
    target: oncall
confidence: 0.9
author: ops
"#;

const JSON_RULE: &str = r#"{
  "rule_id": "net_dns_missing",
  "name": "DNS resolver missing",
  "category": "network",
  "severity": "low",
  "conditions": [
    {"field": "network.dns.servers", "operator": "count", "value": 0}
  ],
  "actions": [{"type": "create_issue"}]
}"#;

#[test]
fn parse_yaml_rule() {
    let rule: Rule = serde_yaml::from_str(YAML_RULE).unwrap();
    assert_eq!(rule.rule_id, "disk_io_wait");
    assert_eq!(rule.severity, Severity::Medium);
    assert_eq!(rule.confidence, 0.9);
    assert_eq!(rule.author, "ops");
    assert_eq!(rule.version, "1.0.0");
    assert!(rule.enabled);

    assert_eq!(rule.conditions.len(), 2);
    assert_eq!(rule.conditions[0].operator, Operator::Gte);
    assert_eq!(rule.conditions[0].value, Some(Value::Number(25.0)));
    assert_eq!(rule.conditions[1].operator, Operator::NoneTrue);
    assert_eq!(rule.conditions[1].field_check.as_deref(), Some("is_up"));
    assert!(rule.conditions[1].value.is_none());

    assert_eq!(
        rule.actions[0],
        Action::CreateIssue {
            severity: Some(Severity::High),
            message: Some("IO wait is high".into()),
            recommendation: Some("Check disk health".into()),
        }
    );
    assert_eq!(
        rule.actions[1],
        Action::Log {
            level: LogLevel::Warning,
            message: Some("io wait rule fired".into()),
        }
    );
    assert_eq!(rule.actions[2], Action::Unknown { kind: "send_pager".into() });
}

#[test]
fn parse_json_rule_with_defaults() {
    let rule: Rule = serde_json::from_str(JSON_RULE).unwrap();
    assert_eq!(rule.rule_id, "net_dns_missing");
    assert_eq!(rule.description, "");
    assert_eq!(rule.confidence, 0.8);
    assert_eq!(rule.author, "system");
    assert_eq!(rule.conditions[0].operator, Operator::Count);
    assert_eq!(
        rule.actions[0],
        Action::CreateIssue {
            severity: None,
            message: None,
            recommendation: None,
        }
    );
}

#[test]
fn missing_operator_defaults_to_equality() {
    let cond: Condition = serde_json::from_str(r#"{"field": "system.os", "value": "linux"}"#).unwrap();
    assert_eq!(cond.operator, Operator::Eq);
}

#[test]
fn unknown_operator_is_preserved() {
    let cond: Condition =
        serde_json::from_str(r#"{"field": "a.b", "operator": "regex", "value": "x.*"}"#).unwrap();
    assert_eq!(cond.operator, Operator::Unknown("regex".into()));
    assert!(!cond.operator.is_known());
    assert_eq!(cond.operator.to_string(), "regex");
}

#[test]
fn operator_spellings() {
    for (text, op) in [
        (">", Operator::Gt),
        ("<", Operator::Lt),
        (">=", Operator::Gte),
        ("<=", Operator::Lte),
        ("==", Operator::Eq),
        ("!=", Operator::Ne),
        ("contains", Operator::Contains),
        ("count", Operator::Count),
        ("all_false", Operator::AllFalse),
        ("none_true", Operator::NoneTrue),
        ("avg>", Operator::AvgGt),
    ] {
        assert_eq!(Operator::from(text), op);
        assert_eq!(op.as_str(), text);
    }
}

#[test]
fn round_trip() {
    let rule: Rule = serde_yaml::from_str(YAML_RULE).unwrap();
    let json = serde_json::to_string(&rule).unwrap();
    let rule2: Rule = serde_json::from_str(&json).unwrap();
    assert_eq!(rule, rule2);
}

#[test]
fn malformed_rules_error() {
    // Missing required rule_id
    assert!(serde_json::from_str::<Rule>(
        r#"{"name": "x", "category": "system", "severity": "low"}"#
    )
    .is_err());

    // Unknown severity
    assert!(serde_json::from_str::<Rule>(
        r#"{"rule_id": "x", "name": "x", "category": "system", "severity": "urgent"}"#
    )
    .is_err());
}

#[test]
fn failed_result_is_zero_confidence() {
    let result = RuleExecutionResult::failed("broken", "boom", std::time::Duration::from_millis(3));
    assert!(!result.matched);
    assert_eq!(result.confidence, 0.0);
    assert!(result.evidence.is_empty());
    assert!(result.is_failure());
}

#[test]
fn execution_time_serializes_as_seconds() {
    let result = RuleExecutionResult::failed("slow", "boom", std::time::Duration::from_millis(1500));
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["execution_time"], serde_json::json!(1.5));
    assert_eq!(json["error"], "boom");
}
