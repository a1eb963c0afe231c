//! Core [`RuleLoader`]: recursive JSON/YAML rule file loading.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::schema::Rule;

use super::error::{LoadError, LoadResult, LoadStatus, Result};

/// Serialization format of a rule file, picked by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleFileFormat {
    Json,
    Yaml,
}

impl RuleFileFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(RuleFileFormat::Json),
            "yaml" | "yml" => Some(RuleFileFormat::Yaml),
            _ => None,
        }
    }
}

/// Rules parsed from a directory tree plus the per-file outcome.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub rules: Vec<Rule>,
    pub results: Vec<LoadResult>,
}

impl LoadReport {
    pub fn failed_files(&self) -> usize {
        self.results.iter().filter(|r| r.status.is_failed()).count()
    }

    pub fn loaded_files(&self) -> usize {
        self.results.iter().filter(|r| r.status.is_loaded()).count()
    }
}

/// Filesystem-backed rule loader.
///
/// Scans a directory recursively for `*.json` / `*.yaml` / `*.yml` files. Each
/// file holds either a flat list of rules or an object with a `rules` list.
/// A malformed file contributes zero rules and never aborts the scan.
pub struct RuleLoader {
    /// Root directory containing rule files.
    rules_dir: PathBuf,
}

impl RuleLoader {
    pub fn new(rules_dir: PathBuf) -> Self {
        Self { rules_dir }
    }

    /// Get the rules directory path.
    pub fn rules_dir(&self) -> &Path {
        &self.rules_dir
    }

    /// Recursively load every rule file under the rules directory.
    ///
    /// Dotfiles and dot-directories (e.g. `.git`) are skipped. Files are
    /// visited in name order so the resulting rule order is stable.
    pub fn load_all(&self) -> LoadReport {
        let mut report = LoadReport::default();

        let walker = WalkDir::new(&self.rules_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!(error = %e, "failed to read rules directory entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.into_path();
            if RuleFileFormat::from_path(&path).is_none() {
                debug!(path = %path.display(), "skipping non-rule file");
                report.results.push(LoadResult {
                    path,
                    status: LoadStatus::Skipped {
                        reason: "not a JSON or YAML file".to_string(),
                    },
                });
                continue;
            }

            match self.load_file(&path) {
                Ok(rules) => {
                    let rule_ids: Vec<String> = rules.iter().map(|r| r.rule_id.clone()).collect();
                    info!(path = %path.display(), count = rule_ids.len(), "loaded rule file");
                    report.rules.extend(rules);
                    report.results.push(LoadResult {
                        path,
                        status: LoadStatus::Loaded { rule_ids },
                    });
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to load rule file");
                    report.results.push(LoadResult {
                        path,
                        status: LoadStatus::Failed {
                            error: e.to_string(),
                        },
                    });
                }
            }
        }

        report
    }

    /// Parse a single rule file. All rules in the file load, or none do.
    pub fn load_file(&self, path: &Path) -> Result<Vec<Rule>> {
        let format = RuleFileFormat::from_path(path).ok_or_else(|| {
            LoadError::Shape(format!("unsupported extension: {}", path.display()))
        })?;
        let contents = fs::read_to_string(path)?;
        let rules = parse_rules(&contents, format)?;
        for rule in &rules {
            validate_rule(rule)?;
        }
        Ok(rules)
    }
}

/// Parse rule file contents in either accepted shape.
pub fn parse_rules(contents: &str, format: RuleFileFormat) -> Result<Vec<Rule>> {
    match format {
        RuleFileFormat::Json => {
            let doc: serde_json::Value = serde_json::from_str(contents)?;
            let list = match doc {
                serde_json::Value::Array(_) => doc,
                serde_json::Value::Object(mut map) => map
                    .remove("rules")
                    .ok_or_else(|| LoadError::Shape("object has no `rules` list".to_string()))?,
                _ => {
                    return Err(LoadError::Shape(
                        "expected a list of rules or an object with a `rules` list".to_string(),
                    ))
                }
            };
            Ok(serde_json::from_value(list)?)
        }
        RuleFileFormat::Yaml => {
            let doc: serde_yaml::Value = serde_yaml::from_str(contents)?;
            let list = match doc {
                serde_yaml::Value::Sequence(_) => doc,
                serde_yaml::Value::Mapping(mut map) => map
                    .remove("rules")
                    .ok_or_else(|| LoadError::Shape("mapping has no `rules` list".to_string()))?,
                _ => {
                    return Err(LoadError::Shape(
                        "expected a list of rules or a mapping with a `rules` list".to_string(),
                    ))
                }
            };
            Ok(serde_yaml::from_value(list)?)
        }
    }
}

fn validate_rule(rule: &Rule) -> Result<()> {
    if rule.rule_id.trim().is_empty() {
        return Err(LoadError::Validation("rule_id must not be empty".to_string()));
    }
    if !(0.0..=1.0).contains(&rule.confidence) {
        return Err(LoadError::Validation(format!(
            "rule '{}' confidence {} is outside [0, 1]",
            rule.rule_id, rule.confidence
        )));
    }
    Ok(())
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}
