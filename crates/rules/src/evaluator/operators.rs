//! Operator semantics over resolved values.
//!
//! Every operator is total: shape mismatches, absent fields and non-numeric
//! operands make the condition unmatched rather than raising an error.

use sysgraph_core::Value;

use crate::resolver::Resolved;
use crate::schema::Operator;

/// Apply `op` to a resolved field value and an optional target.
pub(crate) fn apply(
    resolved: &Resolved,
    op: &Operator,
    target: Option<&Value>,
    field_check: Option<&str>,
) -> bool {
    match op {
        Operator::Gt => compare(resolved, target, |a, b| a > b),
        Operator::Lt => compare(resolved, target, |a, b| a < b),
        Operator::Gte => compare(resolved, target, |a, b| a >= b),
        Operator::Lte => compare(resolved, target, |a, b| a <= b),
        Operator::Eq => resolved.to_value() == target.cloned().unwrap_or_default(),
        Operator::Ne => resolved.to_value() != target.cloned().unwrap_or_default(),
        Operator::Contains => contains(resolved, target),
        Operator::Count => match (resolved, target.and_then(Value::as_f64)) {
            (Resolved::Sequence(items), Some(limit)) => items.len() as f64 > limit,
            _ => false,
        },
        // Missing sub-field counts as truthy: only explicit falsy values qualify.
        Operator::AllFalse => match (resolved, field_check) {
            (Resolved::Sequence(items), Some(key)) => {
                items.iter().all(|item| !element_flag(item, key, true))
            }
            _ => false,
        },
        Operator::NoneTrue => match (resolved, field_check) {
            (Resolved::Sequence(items), Some(key)) => {
                !items.iter().any(|item| element_flag(item, key, false))
            }
            _ => false,
        },
        Operator::AvgGt => match (resolved, target.and_then(Value::as_f64)) {
            (Resolved::Sequence(items), Some(limit)) => {
                mean(items).map(|avg| avg > limit).unwrap_or(false)
            }
            _ => false,
        },
        Operator::Unknown(_) => false,
    }
}

fn compare(resolved: &Resolved, target: Option<&Value>, cmp: impl Fn(f64, f64) -> bool) -> bool {
    let field = match resolved {
        Resolved::Scalar(v) => v.as_f64(),
        Resolved::Absent | Resolved::Sequence(_) => None,
    };
    match (field, target.and_then(Value::as_f64)) {
        (Some(a), Some(b)) => cmp(a, b),
        _ => false,
    }
}

fn contains(resolved: &Resolved, target: Option<&Value>) -> bool {
    let needle = match target {
        None | Some(Value::Null) => return false,
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };
    match resolved {
        Resolved::Absent => false,
        other => other.to_value().to_string().contains(&needle),
    }
}

/// Truthiness of `item[key]`; `missing` is used when the key is absent.
/// Non-mapping elements are treated as truthy so neither predicate fires on them.
fn element_flag(item: &Value, key: &str, missing: bool) -> bool {
    match item.as_mapping() {
        Some(map) => map.get(key).map(Value::is_truthy).unwrap_or(missing),
        None => true,
    }
}

/// Mean of the numeric elements, ignoring everything else.
fn mean(items: &[Value]) -> Option<f64> {
    let numbers: Vec<f64> = items
        .iter()
        .filter_map(|v| match v {
            Value::Number(n) => Some(*n),
            _ => None,
        })
        .collect();
    if numbers.is_empty() {
        None
    } else {
        Some(numbers.iter().sum::<f64>() / numbers.len() as f64)
    }
}
