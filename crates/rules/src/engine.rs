//! Rule orchestration: run every enabled rule against a snapshot.
//!
//! Rules are independent, so they are evaluated in parallel with rayon and
//! collected back in declaration order. A rule that fails (malformed path,
//! panic) yields a zero-confidence failure result and never affects the
//! others.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use rayon::prelude::*;
use sysgraph_core::{RuleEngineConfig, Value};
use tracing::{debug, info, warn};

use crate::actions::{ActionExecutor, ActionOutcome};
use crate::builtin::all_builtin_rules;
use crate::error::RuleError;
use crate::evaluator::ConditionEvaluator;
use crate::schema::{Rule, RuleExecutionResult};
use crate::store::{RuleStatistics, RuleStore};
use crate::sync::{GitFetcher, RemoteSynchronizer, RuleFetcher};

/// Multiplier applied to a matched rule's confidence above the threshold.
pub const CONFIDENCE_BOOST: f64 = 1.1;

/// Reported confidence for a rule result.
///
/// Unmatched is always 0.0. Matched keeps the base confidence, boosted by
/// [`CONFIDENCE_BOOST`] (capped at 1.0) when it exceeds `threshold`.
pub fn boost_confidence(base: f64, threshold: f64, matched: bool) -> f64 {
    if !matched {
        0.0
    } else if base > threshold {
        (base * CONFIDENCE_BOOST).min(1.0)
    } else {
        base
    }
}

/// Evaluates the rule store against snapshots.
///
/// Construction only installs the built-in library; remote sync is driven
/// separately through [`RuleEngine::synchronizer`].
pub struct RuleEngine {
    config: RuleEngineConfig,
    store: Arc<RuleStore>,
}

impl RuleEngine {
    pub fn new(config: RuleEngineConfig) -> Self {
        let store = Arc::new(RuleStore::new(
            config.enable_builtin_rules,
            config.enable_remote_rules,
        ));
        if config.enable_builtin_rules {
            store.set_builtin(all_builtin_rules());
        }
        Self { config, store }
    }

    /// Engine over an existing store, e.g. one shared with a synchronizer.
    pub fn with_store(config: RuleEngineConfig, store: Arc<RuleStore>) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &RuleEngineConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<RuleStore> {
        &self.store
    }

    pub fn statistics(&self) -> RuleStatistics {
        self.store.statistics()
    }

    /// Synchronizer feeding this engine's store through `fetcher`.
    pub fn synchronizer(&self, fetcher: Arc<dyn RuleFetcher>) -> RemoteSynchronizer {
        RemoteSynchronizer::new(&self.config, Arc::clone(&self.store), fetcher)
    }

    /// Synchronizer using the `git` command line with the configured timeout.
    pub fn git_synchronizer(&self) -> RemoteSynchronizer {
        let fetcher = GitFetcher::new(Duration::from_secs(self.config.fetch_timeout));
        self.synchronizer(Arc::new(fetcher))
    }

    /// Run every enabled rule. One result per rule, in rule order.
    pub fn run(&self, snapshot: &Value) -> Vec<RuleExecutionResult> {
        let rules = self.store.current();
        self.run_rules(snapshot, rules.rules())
    }

    /// Run the enabled rules of one category.
    pub fn run_category(&self, snapshot: &Value, category: &str) -> Vec<RuleExecutionResult> {
        let rules = self.store.rules_by_category(category);
        self.run_rules(snapshot, &rules)
    }

    /// Run an explicit rule list; disabled rules are skipped.
    pub fn run_rules(&self, snapshot: &Value, rules: &[Rule]) -> Vec<RuleExecutionResult> {
        let started = Instant::now();
        let results: Vec<RuleExecutionResult> = rules
            .par_iter()
            .filter(|rule| rule.enabled)
            .map(|rule| self.run_isolated(snapshot, rule))
            .collect();

        info!(
            rules = results.len(),
            matched = results.iter().filter(|r| r.matched).count(),
            failed = results.iter().filter(|r| r.is_failure()).count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "rule run complete"
        );
        results
    }

    /// Evaluate one rule and run its actions if every condition matched.
    pub fn execute_rule(
        &self,
        snapshot: &Value,
        rule: &Rule,
    ) -> Result<RuleExecutionResult, RuleError> {
        let started = Instant::now();
        let now = Utc::now();

        let outcome = ConditionEvaluator::evaluate_all(snapshot, &rule.conditions)?;
        let actions = if outcome.matched {
            ActionExecutor::execute(rule, &outcome.evidence, now)
        } else {
            ActionOutcome::default()
        };

        debug!(rule_id = %rule.rule_id, matched = outcome.matched, "rule evaluated");

        Ok(RuleExecutionResult {
            rule_id: rule.rule_id.clone(),
            matched: outcome.matched,
            confidence: boost_confidence(
                rule.confidence,
                self.config.rule_confidence_threshold,
                outcome.matched,
            ),
            evidence: outcome.evidence,
            actions_taken: actions.actions_taken,
            issues_found: actions.issues,
            execution_time: started.elapsed(),
            timestamp: now,
            error: None,
        })
    }

    fn run_isolated(&self, snapshot: &Value, rule: &Rule) -> RuleExecutionResult {
        let started = Instant::now();
        let result = catch_unwind(AssertUnwindSafe(|| self.execute_rule(snapshot, rule)))
            .unwrap_or_else(|payload| Err(RuleError::Panicked(panic_message(payload.as_ref()))));

        result.unwrap_or_else(|e| {
            warn!(rule_id = %rule.rule_id, error = %e, "rule evaluation failed");
            let mut failed =
                RuleExecutionResult::failed(rule.rule_id.clone(), e.to_string(), started.elapsed());
            failed.evidence = e.evidence().to_vec();
            failed
        })
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

// ── Tests ───────────────────────────────────────────────────────────
