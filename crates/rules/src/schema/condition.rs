//! Rule conditions and the closed operator set.

use std::fmt;

use serde::{Deserialize, Serialize};
use sysgraph_core::Value;

/// A single `field operator value` test.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Condition {
    /// Dotted path into the snapshot, optionally with one `[*]` wildcard.
    pub field: String,
    #[serde(default)]
    pub operator: Operator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Sub-field inspected by `all_false` / `none_true`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_check: Option<String>,
}

impl Condition {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: Some(value.into()),
            field_check: None,
        }
    }

    /// A collection predicate (`all_false`, `none_true`) over `field_check`.
    pub fn check(field: impl Into<String>, operator: Operator, field_check: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: None,
            field_check: Some(field_check.into()),
        }
    }
}

/// Condition operators.
///
/// Rule files spell operators as strings (`">"`, `"avg>"`, ...). Names outside
/// the known set are kept as [`Operator::Unknown`] so a single unrecognized
/// operator makes its condition unmatched instead of failing the whole file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    Gt,
    Lt,
    Gte,
    Lte,
    #[default]
    Eq,
    Ne,
    Contains,
    Count,
    AllFalse,
    NoneTrue,
    AvgGt,
    Unknown(String),
}

impl Operator {
    pub fn as_str(&self) -> &str {
        match self {
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Gte => ">=",
            Operator::Lte => "<=",
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Contains => "contains",
            Operator::Count => "count",
            Operator::AllFalse => "all_false",
            Operator::NoneTrue => "none_true",
            Operator::AvgGt => "avg>",
            Operator::Unknown(name) => name,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Operator::Unknown(_))
    }
}

impl From<&str> for Operator {
    fn from(s: &str) -> Self {
        match s.trim() {
            ">" => Operator::Gt,
            "<" => Operator::Lt,
            ">=" => Operator::Gte,
            "<=" => Operator::Lte,
            "==" => Operator::Eq,
            "!=" => Operator::Ne,
            "contains" => Operator::Contains,
            "count" => Operator::Count,
            "all_false" => Operator::AllFalse,
            "none_true" => Operator::NoneTrue,
            "avg>" => Operator::AvgGt,
            other => Operator::Unknown(other.to_string()),
        }
    }
}

impl From<String> for Operator {
    fn from(s: String) -> Self {
        Operator::from(s.as_str())
    }
}

impl From<Operator> for String {
    fn from(op: Operator) -> Self {
        op.as_str().to_string()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
