//! Field path resolution over snapshot values.
//!
//! A path is a dot-separated list of map keys, optionally split by a single
//! `[*]` wildcard into `base[*]sub`. The base must resolve to a sequence; the
//! sub-path is then looked up in every mapping element, in order. Missing keys
//! never fail, they resolve to [`Resolved::Absent`] (or `Null` per element).

use std::fmt;
use std::str::FromStr;

use sysgraph_core::Value;

use crate::error::PathError;

const WILDCARD: &str = "[*]";

/// A parsed field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    raw: String,
    base: Vec<String>,
    /// Sub-path segments after `[*]`; `Some(vec![])` selects the elements themselves.
    wildcard: Option<Vec<String>>,
}

impl FieldPath {
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PathError::Empty);
        }
        if trimmed.matches(WILDCARD).count() > 1 {
            return Err(PathError::MultipleWildcards(trimmed.to_string()));
        }

        let (base, wildcard) = match trimmed.split_once(WILDCARD) {
            Some((base, sub)) => {
                let sub = sub.strip_prefix('.').unwrap_or(sub);
                let sub = if sub.is_empty() {
                    Vec::new()
                } else {
                    split_segments(sub, trimmed)?
                };
                // An empty base addresses the snapshot root.
                let base = if base.is_empty() {
                    Vec::new()
                } else {
                    split_segments(base, trimmed)?
                };
                (base, Some(sub))
            }
            None => (split_segments(trimmed, trimmed)?, None),
        };

        Ok(Self {
            raw: trimmed.to_string(),
            base,
            wildcard,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn has_wildcard(&self) -> bool {
        self.wildcard.is_some()
    }
}

fn split_segments(part: &str, whole: &str) -> Result<Vec<String>, PathError> {
    part.split('.')
        .map(|seg| {
            if seg.is_empty() {
                Err(PathError::EmptySegment(whole.to_string()))
            } else {
                Ok(seg.to_string())
            }
        })
        .collect()
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldPath::parse(s)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Outcome of resolving a path against a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// The path addresses nothing (missing key, or an explicit null).
    Absent,
    /// Any non-sequence value, including mappings.
    Scalar(Value),
    /// A sequence value, or the positional results of a wildcard expansion.
    Sequence(Vec<Value>),
}

impl Resolved {
    pub fn is_absent(&self) -> bool {
        matches!(self, Resolved::Absent)
    }

    /// Collapse back into a single value (`Absent` becomes `Null`).
    pub fn to_value(&self) -> Value {
        match self {
            Resolved::Absent => Value::Null,
            Resolved::Scalar(v) => v.clone(),
            Resolved::Sequence(items) => Value::Sequence(items.clone()),
        }
    }
}

impl fmt::Display for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolved::Absent => f.write_str("absent"),
            other => write!(f, "{}", other.to_value()),
        }
    }
}

/// Walk `segments` as map-key lookups from `root`.
fn lookup<'a>(root: &'a Value, segments: &[String]) -> Option<&'a Value> {
    segments.iter().try_fold(root, |current, key| current.get(key))
}

/// Resolve a parsed path against a snapshot.
pub fn resolve(snapshot: &Value, path: &FieldPath) -> Resolved {
    let base = lookup(snapshot, &path.base);

    let Some(sub) = &path.wildcard else {
        return match base {
            None | Some(Value::Null) => Resolved::Absent,
            Some(Value::Sequence(items)) => Resolved::Sequence(items.clone()),
            Some(value) => Resolved::Scalar(value.clone()),
        };
    };

    let items = match base {
        Some(Value::Sequence(items)) => items,
        _ => return Resolved::Sequence(Vec::new()),
    };

    if sub.is_empty() {
        return Resolved::Sequence(items.clone());
    }

    Resolved::Sequence(
        items
            .iter()
            .filter(|item| item.as_mapping().is_some())
            .map(|item| lookup(item, sub).cloned().unwrap_or(Value::Null))
            .collect(),
    )
}

/// Parse and resolve in one step.
pub fn resolve_path(snapshot: &Value, path: &str) -> Result<Resolved, PathError> {
    Ok(resolve(snapshot, &FieldPath::parse(path)?))
}
