//! In-memory rule store: built-in and remote rules merged into one set.
//!
//! The merged set is an immutable [`RuleSet`] behind an `Arc`. Writers build a
//! new set and swap the pointer under a short write lock, so a concurrent
//! `run` holds either the old set or the new one, never a mix.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::schema::Rule;

/// One immutable version of the rule store's contents.
#[derive(Debug, Default)]
pub struct RuleSet {
    builtin: Vec<Rule>,
    remote: Vec<Rule>,
    /// Enabled rules: built-ins (minus those overridden remotely), then remote.
    merged: Vec<Rule>,
}

impl RuleSet {
    fn build(builtin: Vec<Rule>, remote: Vec<Rule>) -> Self {
        let remote_ids: HashSet<&str> = remote.iter().map(|r| r.rule_id.as_str()).collect();
        let merged = builtin
            .iter()
            .filter(|r| !remote_ids.contains(r.rule_id.as_str()))
            .chain(remote.iter())
            .filter(|r| r.enabled)
            .cloned()
            .collect();
        Self {
            builtin,
            remote,
            merged,
        }
    }

    /// Enabled rules in evaluation order.
    pub fn rules(&self) -> &[Rule] {
        &self.merged
    }

    pub fn builtin_count(&self) -> usize {
        self.builtin.len()
    }

    pub fn remote_count(&self) -> usize {
        self.remote.len()
    }
}

/// Rule counts reported by [`RuleStore::statistics`].
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RuleStatistics {
    /// Enabled rules in the merged set.
    pub total_rules: usize,
    pub builtin_rules: usize,
    pub remote_rules: usize,
    pub by_category: BTreeMap<String, usize>,
    pub by_severity: BTreeMap<String, usize>,
    pub last_remote_update: Option<DateTime<Utc>>,
}

/// Holds the current [`RuleSet`] and swaps it atomically on update.
pub struct RuleStore {
    include_builtin: bool,
    include_remote: bool,
    current: RwLock<Arc<RuleSet>>,
    last_remote_update: RwLock<Option<DateTime<Utc>>>,
}

impl RuleStore {
    /// An empty store. Disabled sources are accepted but ignored.
    pub fn new(include_builtin: bool, include_remote: bool) -> Self {
        Self {
            include_builtin,
            include_remote,
            current: RwLock::new(Arc::new(RuleSet::default())),
            last_remote_update: RwLock::new(None),
        }
    }

    /// The current rule set. Cheap; callers keep it for the whole run.
    pub fn current(&self) -> Arc<RuleSet> {
        Arc::clone(&self.current.read().expect("rule store lock poisoned"))
    }

    /// Enabled rules, cloned out of the current set.
    pub fn rules(&self) -> Vec<Rule> {
        self.current().rules().to_vec()
    }

    pub fn rules_by_category(&self, category: &str) -> Vec<Rule> {
        self.current()
            .rules()
            .iter()
            .filter(|r| r.category == category)
            .cloned()
            .collect()
    }

    pub fn builtin_count(&self) -> usize {
        self.current().builtin_count()
    }

    pub fn remote_count(&self) -> usize {
        self.current().remote_count()
    }

    /// Install the built-in rule library.
    pub fn set_builtin(&self, rules: Vec<Rule>) {
        if !self.include_builtin {
            return;
        }
        let count = rules.len();
        self.swap(|old| RuleSet::build(rules, old.remote.clone()));
        info!(count, "built-in rules installed");
    }

    /// Replace the remote rule set wholesale.
    ///
    /// Rules with an id already seen earlier in `rules` are dropped with a
    /// warning. Returns the number of remote rules kept.
    pub fn replace_remote(&self, rules: Vec<Rule>) -> usize {
        if !self.include_remote {
            return 0;
        }
        let rules = dedupe(rules);
        let count = rules.len();
        self.swap(|old| RuleSet::build(old.builtin.clone(), rules));
        info!(count, "remote rules replaced");
        count
    }

    pub fn mark_remote_updated(&self, at: DateTime<Utc>) {
        *self
            .last_remote_update
            .write()
            .expect("rule store lock poisoned") = Some(at);
    }

    pub fn last_remote_update(&self) -> Option<DateTime<Utc>> {
        *self
            .last_remote_update
            .read()
            .expect("rule store lock poisoned")
    }

    pub fn statistics(&self) -> RuleStatistics {
        let set = self.current();
        let mut by_category = BTreeMap::new();
        let mut by_severity = BTreeMap::new();
        for rule in set.rules() {
            *by_category.entry(rule.category.clone()).or_insert(0) += 1;
            *by_severity.entry(rule.severity.to_string()).or_insert(0) += 1;
        }
        RuleStatistics {
            total_rules: set.rules().len(),
            builtin_rules: set.builtin_count(),
            remote_rules: set.remote_count(),
            by_category,
            by_severity,
            last_remote_update: self.last_remote_update(),
        }
    }

    fn swap(&self, build: impl FnOnce(&RuleSet) -> RuleSet) {
        let mut guard = self.current.write().expect("rule store lock poisoned");
        let next = build(&guard);
        *guard = Arc::new(next);
    }
}

fn dedupe(rules: Vec<Rule>) -> Vec<Rule> {
    let mut seen = HashSet::new();
    rules
        .into_iter()
        .filter(|rule| {
            let first = seen.insert(rule.rule_id.clone());
            if !first {
                warn!(rule_id = %rule.rule_id, "duplicate remote rule id, keeping the first");
            }
            first
        })
        .collect()
}
