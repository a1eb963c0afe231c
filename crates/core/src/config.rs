use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    env_opt(key).unwrap_or_else(|| default.to_string())
}

fn env_bool(key: &str, default: bool) -> bool {
    match env_opt(key).as_deref().map(str::to_ascii_lowercase).as_deref() {
        Some("1") | Some("true") | Some("yes") | Some("on") => true,
        Some("0") | Some("false") | Some("no") | Some("off") => false,
        _ => default,
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_f64(key: &str, default: f64) -> f64 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

pub const DEFAULT_REMOTE_RULES_URL: &str = "https://gitea.example.com/sysgraph/rules";

/// Default rule cache location: `~/.sysgraph/rules` (falls back to `.sysgraph/rules`).
pub fn default_cache_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".sysgraph")
        .join("rules")
}

// ── Rule engine ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RuleEngineConfig {
    pub enable_builtin_rules: bool,
    pub enable_remote_rules: bool,
    pub remote_rules_url: String,
    /// Seconds between remote refreshes.
    pub rules_update_interval: u64,
    /// Matched rules whose base confidence exceeds this get boosted.
    pub rule_confidence_threshold: f64,
    pub cache_dir: PathBuf,
    /// Seconds before a remote fetch is abandoned.
    pub fetch_timeout: u64,
}

impl Default for RuleEngineConfig {
    fn default() -> Self {
        Self {
            enable_builtin_rules: true,
            enable_remote_rules: true,
            remote_rules_url: DEFAULT_REMOTE_RULES_URL.to_string(),
            rules_update_interval: 86_400,
            rule_confidence_threshold: 0.8,
            cache_dir: default_cache_dir(),
            fetch_timeout: 120,
        }
    }
}

impl RuleEngineConfig {
    /// Build config from `SYSGRAPH_*` environment variables (call `load_dotenv()` first).
    ///
    /// Unset or unparsable variables fall back to [`Default`].
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enable_builtin_rules: env_bool("SYSGRAPH_ENABLE_BUILTIN_RULES", defaults.enable_builtin_rules),
            enable_remote_rules: env_bool("SYSGRAPH_ENABLE_REMOTE_RULES", defaults.enable_remote_rules),
            remote_rules_url: env_or("SYSGRAPH_REMOTE_RULES_URL", &defaults.remote_rules_url),
            rules_update_interval: env_u64("SYSGRAPH_RULES_UPDATE_INTERVAL", defaults.rules_update_interval),
            rule_confidence_threshold: env_f64(
                "SYSGRAPH_RULE_CONFIDENCE_THRESHOLD",
                defaults.rule_confidence_threshold,
            ),
            cache_dir: env_opt("SYSGRAPH_RULES_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_dir),
            fetch_timeout: env_u64("SYSGRAPH_RULES_FETCH_TIMEOUT", defaults.fetch_timeout),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.rule_confidence_threshold) {
            return Err(ConfigError::ConfidenceThreshold(self.rule_confidence_threshold));
        }
        if self.rules_update_interval == 0 {
            return Err(ConfigError::UpdateInterval);
        }
        if self.enable_remote_rules && self.remote_rules_url.trim().is_empty() {
            return Err(ConfigError::RemoteUrl);
        }
        Ok(())
    }

    /// Directory the remote repository is cloned into.
    pub fn remote_repo_dir(&self) -> PathBuf {
        self.cache_dir.join("remote_repo")
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Rule engine config:");
        tracing::info!("  builtin:     enabled={}", self.enable_builtin_rules);
        tracing::info!("  remote:      enabled={}, url={}", self.enable_remote_rules, self.remote_rules_url);
        tracing::info!("  refresh:     every {}s (fetch timeout {}s)", self.rules_update_interval, self.fetch_timeout);
        tracing::info!("  confidence:  boost above {}", self.rule_confidence_threshold);
        tracing::info!("  cache_dir:   {}", self.cache_dir.display());
    }
}
