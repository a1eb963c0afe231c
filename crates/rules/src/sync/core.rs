//! [`RemoteSynchronizer`]: fetch, reload and swap the remote rule set.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::Utc;
use sysgraph_core::RuleEngineConfig;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::SyncError;
use crate::loader::{LoadResult, RuleLoader};
use crate::store::RuleStore;

use super::fetcher::RuleFetcher;

/// Outcome of one synchronization cycle.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// The fetcher ran and succeeded this cycle.
    pub fetched: bool,
    /// Set when the fetcher ran and failed.
    pub fetch_error: Option<String>,
    /// Per-file load outcome from the cache directory.
    pub files: Vec<LoadResult>,
    /// Remote rules installed after de-duplication.
    pub rules_loaded: usize,
}

/// Keeps the store's remote rule set in step with the remote repository.
///
/// Construction has no side effects; call [`sync_once`](Self::sync_once)
/// directly or [`start`](Self::start) a periodic task.
pub struct RemoteSynchronizer {
    store: Arc<RuleStore>,
    fetcher: Arc<dyn RuleFetcher>,
    source_url: String,
    repo_dir: PathBuf,
    update_interval: Duration,
    /// Monotonic time of the last successful fetch, for the due check.
    last_fetch: Mutex<Option<Instant>>,
}

impl RemoteSynchronizer {
    pub fn new(
        config: &RuleEngineConfig,
        store: Arc<RuleStore>,
        fetcher: Arc<dyn RuleFetcher>,
    ) -> Self {
        Self {
            store,
            fetcher,
            source_url: config.remote_rules_url.clone(),
            repo_dir: config.remote_repo_dir(),
            update_interval: Duration::from_secs(config.rules_update_interval),
            last_fetch: Mutex::new(None),
        }
    }

    /// Override the refresh cadence.
    pub fn with_update_interval(mut self, interval: Duration) -> Self {
        self.update_interval = interval;
        self
    }

    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }

    /// True when no fetch has succeeded yet, or the last success is more
    /// than the update interval before `now`.
    pub fn should_update(&self, now: Instant) -> bool {
        match *self.last_fetch.lock().expect("sync lock poisoned") {
            None => true,
            Some(last) => now.saturating_duration_since(last) > self.update_interval,
        }
    }

    /// Run one cycle: fetch when due, then reload the cache directory.
    ///
    /// Failures are logged and reported, never returned: a failed fetch
    /// leaves the cached checkout (and so the remote rules) as they were.
    pub async fn sync_once(&self) -> SyncReport {
        let mut report = SyncReport::default();

        let started = Instant::now();
        if self.should_update(started) {
            match self.fetcher.fetch(&self.source_url, &self.repo_dir).await {
                Ok(()) => {
                    *self.last_fetch.lock().expect("sync lock poisoned") = Some(started);
                    self.store.mark_remote_updated(Utc::now());
                    report.fetched = true;
                    info!(
                        fetcher = self.fetcher.name(),
                        source = %self.source_url,
                        "remote rules fetched"
                    );
                }
                Err(e) => {
                    warn!(
                        fetcher = self.fetcher.name(),
                        source = %self.source_url,
                        error = %e,
                        "remote rule fetch failed, keeping cached rules"
                    );
                    report.fetch_error = Some(e.to_string());
                }
            }
        } else {
            debug!("remote rules are fresh, skipping fetch");
        }

        self.load_cache(&mut report).await;
        report
    }

    /// Reload the cache directory without fetching.
    pub async fn reload(&self) -> SyncReport {
        let mut report = SyncReport::default();
        self.load_cache(&mut report).await;
        report
    }

    async fn load_cache(&self, report: &mut SyncReport) {
        if !self.repo_dir.is_dir() {
            warn!(path = %self.repo_dir.display(), "rule cache directory missing, remote rules unchanged");
            return;
        }

        let loader = RuleLoader::new(self.repo_dir.clone());
        match tokio::task::spawn_blocking(move || loader.load_all()).await {
            Ok(loaded) => {
                report.rules_loaded = self.store.replace_remote(loaded.rules);
                report.files = loaded.results;
            }
            Err(e) => {
                let err = SyncError::Join(e.to_string());
                warn!(error = %err, "remote rules unchanged");
            }
        }
    }

    /// Spawn the periodic sync task on the current tokio runtime.
    pub fn start(self: Arc<Self>) -> SyncHandle {
        let shutdown = Arc::new(Notify::new());
        let signal = Arc::clone(&shutdown);

        let task = tokio::spawn(async move {
            info!(
                interval_secs = self.update_interval.as_secs(),
                path = %self.repo_dir.display(),
                "remote rule sync started"
            );
            loop {
                let report = self.sync_once().await;
                debug!(
                    fetched = report.fetched,
                    rules = report.rules_loaded,
                    files = report.files.len(),
                    "sync cycle complete"
                );

                tokio::select! {
                    _ = tokio::time::sleep(self.update_interval) => {}
                    _ = signal.notified() => break,
                }
            }
            info!("remote rule sync stopped");
        });

        SyncHandle { shutdown, task }
    }
}

/// Handle to a running periodic sync task.
pub struct SyncHandle {
    shutdown: Arc<Notify>,
    task: JoinHandle<()>,
}

impl SyncHandle {
    /// Stop after the in-flight cycle (if any) and wait for the task to end.
    pub async fn stop(self) {
        self.shutdown.notify_one();
        if let Err(e) = self.task.await {
            warn!(error = %e, "remote rule sync task ended abnormally");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
