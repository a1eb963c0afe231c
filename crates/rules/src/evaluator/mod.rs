//! Condition evaluation with audit evidence.
//!
//! Each condition resolves its field path against the snapshot, applies its
//! operator, and records a one-line evidence string whether or not it matched.
//! A rule's condition list is a logical AND; all conditions are evaluated so
//! partial matches stay auditable.

mod operators;

use sysgraph_core::Value;
use tracing::warn;

use crate::error::RuleError;
use crate::resolver::{resolve, FieldPath, Resolved};
use crate::schema::{Condition, Operator};

/// Result of testing a single condition.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionOutcome {
    pub matched: bool,
    pub evidence: String,
}

/// Result of testing a rule's full condition list.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionsOutcome {
    pub matched: bool,
    /// One entry per condition, in declaration order.
    pub evidence: Vec<String>,
}

/// Evaluates conditions against snapshots.
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// Apply an operator to an already-resolved value.
    ///
    /// `field` is only used to label the evidence line.
    pub fn evaluate(
        field: &str,
        resolved: &Resolved,
        operator: &Operator,
        target: Option<&Value>,
        field_check: Option<&str>,
    ) -> ConditionOutcome {
        let matched = operators::apply(resolved, operator, target, field_check);
        let label = evidence_label(field, operator, target, field_check);

        let evidence = if matched {
            format!("{}: matched", label)
        } else if !operator.is_known() {
            warn!(field = %field, operator = %operator, "unknown condition operator");
            format!("{}: not matched (unknown operator)", label)
        } else {
            format!("{}: not matched (observed: {})", label, resolved)
        };

        ConditionOutcome { matched, evidence }
    }

    /// Resolve and test a single condition.
    pub fn evaluate_condition(
        snapshot: &Value,
        condition: &Condition,
    ) -> Result<ConditionOutcome, crate::error::PathError> {
        let path = FieldPath::parse(&condition.field)?;
        let resolved = resolve(snapshot, &path);
        Ok(Self::evaluate(
            &condition.field,
            &resolved,
            &condition.operator,
            condition.value.as_ref(),
            condition.field_check.as_deref(),
        ))
    }

    /// Test every condition (AND). An empty list matches vacuously.
    ///
    /// A malformed field path fails the rule with a [`RuleError`] naming the
    /// first bad condition; the remaining conditions are still evaluated and
    /// their evidence travels with the error.
    pub fn evaluate_all(
        snapshot: &Value,
        conditions: &[Condition],
    ) -> Result<ConditionsOutcome, RuleError> {
        let mut matched = true;
        let mut evidence = Vec::with_capacity(conditions.len());
        let mut first_error = None;

        for (index, condition) in conditions.iter().enumerate() {
            match Self::evaluate_condition(snapshot, condition) {
                Ok(outcome) => {
                    matched &= outcome.matched;
                    evidence.push(outcome.evidence);
                }
                Err(source) => {
                    matched = false;
                    evidence.push(format!("{}: invalid path ({})", condition.field, source));
                    if first_error.is_none() {
                        first_error = Some((index, condition.field.clone(), source));
                    }
                }
            }
        }

        match first_error {
            Some((index, field, source)) => Err(RuleError::Path {
                index,
                field,
                source,
                evidence,
            }),
            None => Ok(ConditionsOutcome { matched, evidence }),
        }
    }
}

fn evidence_label(
    field: &str,
    operator: &Operator,
    target: Option<&Value>,
    field_check: Option<&str>,
) -> String {
    let target = target.map(Value::to_string).unwrap_or_else(|| "null".to_string());
    match field_check {
        Some(check) => format!("{} {}({}) {}", field, operator, check, target),
        None => format!("{} {} {}", field, operator, target),
    }
}

// ── Tests ───────────────────────────────────────────────────────────
