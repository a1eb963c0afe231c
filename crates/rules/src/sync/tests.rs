//! Tests for remote rule synchronization: an in-process fetcher for the
//! cycle logic, and the `git` fetcher against a local source repository.

use std::fs;
use std::path::Path;
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use sysgraph_core::{RuleEngineConfig, Severity};
use tempfile::TempDir;

use super::*;
use crate::error::{SyncError, SyncResult};
use crate::schema::Rule;
use crate::store::RuleStore;

const DISK_RULES: &str = r#"[
  {"rule_id": "remote_disk_io", "name": "Disk IO", "category": "hardware", "severity": "high"},
  {"rule_id": "remote_inode", "name": "Inodes", "category": "hardware", "severity": "medium"}
]"#;

const NET_RULES: &str = r#"
rules:
  - rule_id: remote_dns
    name: DNS
    category: network
    severity: critical
"#;

/// Writes a fixed set of files into the checkout, or fails.
struct FakeFetcher {
    files: Vec<(&'static str, &'static str)>,
    fail: bool,
    calls: AtomicUsize,
}

impl FakeFetcher {
    fn writing(files: Vec<(&'static str, &'static str)>) -> Self {
        Self {
            files,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            files: Vec::new(),
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RuleFetcher for FakeFetcher {
    async fn fetch(&self, _source: &str, repo_dir: &Path) -> SyncResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(SyncError::Command {
                command: "git pull".to_string(),
                code: 1,
                stderr: "network unreachable".to_string(),
            });
        }
        for (name, contents) in &self.files {
            let path = repo_dir.join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, contents)?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "fake"
    }
}

fn setup(fetcher: Arc<FakeFetcher>) -> (TempDir, Arc<RuleStore>, RemoteSynchronizer) {
    let dir = TempDir::new().expect("create tempdir");
    let config = RuleEngineConfig {
        cache_dir: dir.path().to_path_buf(),
        ..RuleEngineConfig::default()
    };
    let store = Arc::new(RuleStore::new(true, true));
    let sync = RemoteSynchronizer::new(&config, Arc::clone(&store), fetcher);
    (dir, store, sync)
}

#[tokio::test]
async fn first_sync_fetches_and_loads_cache() {
    let fetcher = Arc::new(FakeFetcher::writing(vec![
        ("disk.json", DISK_RULES),
        ("network/dns.yaml", NET_RULES),
    ]));
    let (_dir, store, sync) = setup(Arc::clone(&fetcher));

    let report = sync.sync_once().await;

    assert!(report.fetched);
    assert!(report.fetch_error.is_none());
    assert_eq!(report.rules_loaded, 3);
    assert_eq!(report.files.len(), 2);
    assert_eq!(store.remote_count(), 3);
    assert!(store.last_remote_update().is_some());
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn reload_replaces_remote_set_wholesale() {
    let fetcher = Arc::new(FakeFetcher::writing(vec![
        ("disk.json", DISK_RULES),
        ("dns.yaml", NET_RULES),
    ]));
    let (_dir, store, sync) = setup(Arc::clone(&fetcher));
    sync.sync_once().await;
    assert_eq!(store.remote_count(), 3);

    fs::remove_file(sync.repo_dir().join("disk.json")).unwrap();
    let report = sync.sync_once().await;

    // Not due yet, but the cache is still re-read.
    assert!(!report.fetched);
    assert_eq!(fetcher.calls(), 1);
    let ids: Vec<_> = store.rules().into_iter().map(|r| r.rule_id).collect();
    assert_eq!(ids, vec!["remote_dns"]);
}

#[tokio::test]
async fn failed_fetch_keeps_cached_rules() {
    let fetcher = Arc::new(FakeFetcher::failing());
    let (_dir, store, sync) = setup(fetcher);
    fs::create_dir_all(sync.repo_dir()).unwrap();
    fs::write(sync.repo_dir().join("disk.json"), DISK_RULES).unwrap();

    let report = sync.sync_once().await;

    assert!(!report.fetched);
    assert!(report
        .fetch_error
        .as_deref()
        .unwrap()
        .contains("network unreachable"));
    assert_eq!(report.rules_loaded, 2);
    assert!(store.last_remote_update().is_none());
}

#[tokio::test]
async fn missing_cache_leaves_remote_set_unchanged() {
    let fetcher = Arc::new(FakeFetcher::failing());
    let (_dir, store, sync) = setup(fetcher);
    store.replace_remote(vec![Rule::new("kept", "Kept", "system", Severity::Low)]);

    let report = sync.sync_once().await;

    assert!(report.fetch_error.is_some());
    assert!(report.files.is_empty());
    assert_eq!(store.rules()[0].rule_id, "kept");
}

#[tokio::test]
async fn malformed_cache_file_is_skipped() {
    let fetcher = Arc::new(FakeFetcher::writing(vec![
        ("a.json", DISK_RULES),
        ("b.json", "[{ broken"),
        (".git/HEAD.yaml", NET_RULES),
    ]));
    let (_dir, store, sync) = setup(fetcher);

    let report = sync.sync_once().await;

    assert_eq!(report.rules_loaded, 2);
    assert_eq!(report.files.iter().filter(|f| f.status.is_failed()).count(), 1);
    assert_eq!(store.remote_count(), 2);
}

#[tokio::test]
async fn should_update_follows_the_monotonic_interval() {
    let fetcher = Arc::new(FakeFetcher::writing(Vec::new()));
    let (_dir, store, sync) = setup(fetcher);
    let sync = sync.with_update_interval(Duration::from_secs(60));

    assert!(sync.should_update(Instant::now()));
    sync.sync_once().await;

    assert!(!sync.should_update(Instant::now()));
    assert!(sync.should_update(Instant::now() + Duration::from_secs(61)));
    assert!(store.last_remote_update().is_some());
}

#[tokio::test]
async fn failed_fetch_stays_due() {
    let fetcher = Arc::new(FakeFetcher::failing());
    let (_dir, _store, sync) = setup(Arc::clone(&fetcher));

    sync.sync_once().await;
    sync.sync_once().await;

    assert!(sync.should_update(Instant::now()));
    assert_eq!(fetcher.calls(), 2);
}

#[tokio::test]
async fn start_runs_a_cycle_and_stop_ends_the_task() {
    let fetcher = Arc::new(FakeFetcher::writing(vec![("disk.json", DISK_RULES)]));
    let (_dir, store, sync) = setup(Arc::clone(&fetcher));
    let sync = Arc::new(sync.with_update_interval(Duration::from_secs(3600)));

    let handle = sync.start();
    handle.stop().await;

    assert_eq!(fetcher.calls(), 1);
    assert_eq!(store.remote_count(), 2);
}

#[tokio::test]
async fn reload_reads_cache_without_fetching() {
    let fetcher = Arc::new(FakeFetcher::failing());
    let (_dir, store, sync) = setup(Arc::clone(&fetcher));
    fs::create_dir_all(sync.repo_dir()).unwrap();
    fs::write(sync.repo_dir().join("dns.yml"), NET_RULES).unwrap();

    let report = sync.reload().await;

    assert_eq!(fetcher.calls(), 0);
    assert!(report.fetch_error.is_none());
    assert_eq!(report.rules_loaded, 1);
    assert_eq!(store.rules()[0].rule_id, "remote_dns");
}

// ── GitFetcher ──────────────────────────────────────────────────────

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args([
            "-c",
            "user.name=sysgraph",
            "-c",
            "user.email=sysgraph@example.com",
            "-c",
            "init.defaultBranch=main",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .current_dir(dir)
        .output()
        .expect("run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

fn commit_file(repo: &Path, name: &str, contents: &str) {
    fs::write(repo.join(name), contents).unwrap();
    git(repo, &["add", name]);
    git(repo, &["commit", "-q", "-m", &format!("add {}", name)]);
}

/// A local repository holding `disk.json`, usable as a clone source.
fn source_repo() -> TempDir {
    let dir = TempDir::new().expect("create tempdir");
    git(dir.path(), &["init", "-q"]);
    commit_file(dir.path(), "disk.json", DISK_RULES);
    dir
}

fn git_setup(source: &TempDir) -> (TempDir, Arc<RuleStore>, RemoteSynchronizer, Arc<GitFetcher>) {
    let cache = TempDir::new().expect("create tempdir");
    let config = RuleEngineConfig {
        cache_dir: cache.path().to_path_buf(),
        remote_rules_url: source.path().to_string_lossy().into_owned(),
        ..RuleEngineConfig::default()
    };
    let fetcher = Arc::new(GitFetcher::new(Duration::from_secs(30)));
    let store = Arc::new(RuleStore::new(false, true));
    let sync = RemoteSynchronizer::new(&config, Arc::clone(&store), Arc::clone(&fetcher) as Arc<dyn RuleFetcher>);
    (cache, store, sync, fetcher)
}

fn staging_of(repo_dir: &Path) -> std::path::PathBuf {
    repo_dir.with_file_name("remote_repo.partial")
}

#[tokio::test]
async fn git_fetch_clones_then_pulls_new_commits() {
    if !git_available() {
        return;
    }
    let source = source_repo();
    let (_cache, store, sync, fetcher) = git_setup(&source);

    let report = sync.sync_once().await;
    assert!(report.fetched, "{:?}", report.fetch_error);
    assert_eq!(report.rules_loaded, 2);
    assert!(sync.repo_dir().join(".git").is_dir());
    assert!(!staging_of(sync.repo_dir()).exists());

    commit_file(source.path(), "dns.yaml", NET_RULES);
    let url = source.path().to_string_lossy();
    fetcher.fetch(&url, sync.repo_dir()).await.unwrap();

    let report = sync.reload().await;
    assert_eq!(report.rules_loaded, 3);
    assert!(store.rules().iter().any(|r| r.rule_id == "remote_dns"));
}

#[tokio::test]
async fn git_fetch_failure_reports_exit_code_and_stderr() {
    if !git_available() {
        return;
    }
    let cache = TempDir::new().unwrap();
    let repo_dir = cache.path().join("remote_repo");
    let missing = cache.path().join("no-such-source");
    let fetcher = GitFetcher::new(Duration::from_secs(30));

    let err = fetcher
        .fetch(&missing.to_string_lossy(), &repo_dir)
        .await
        .unwrap_err();

    match err {
        SyncError::Command { code, stderr, .. } => {
            assert_ne!(code, 0);
            assert!(!stderr.is_empty());
        }
        other => panic!("expected command failure, got {:?}", other),
    }
    assert!(!repo_dir.exists());
    assert!(!staging_of(&repo_dir).exists());
}

#[tokio::test]
async fn git_fetch_replaces_a_cache_that_is_not_a_checkout() {
    if !git_available() {
        return;
    }
    let source = source_repo();
    let (_cache, store, sync, _fetcher) = git_setup(&source);
    fs::create_dir_all(sync.repo_dir()).unwrap();
    fs::write(sync.repo_dir().join("leftover.yaml"), NET_RULES).unwrap();

    let report = sync.sync_once().await;

    assert!(report.fetched, "{:?}", report.fetch_error);
    assert!(sync.repo_dir().join(".git").is_dir());
    assert!(!sync.repo_dir().join("leftover.yaml").exists());
    let mut ids: Vec<_> = store.rules().into_iter().map(|r| r.rule_id).collect();
    ids.sort();
    assert_eq!(ids, vec!["remote_disk_io", "remote_inode"]);
}

#[tokio::test]
async fn timed_out_clone_leaves_no_checkout_and_recovers() {
    if !git_available() {
        return;
    }
    let source = source_repo();
    let url = source.path().to_string_lossy().into_owned();
    let cache = TempDir::new().unwrap();
    let repo_dir = cache.path().join("remote_repo");

    let err = GitFetcher::new(Duration::ZERO)
        .fetch(&url, &repo_dir)
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Timeout { .. }), "{:?}", err);
    assert!(!repo_dir.exists());

    GitFetcher::new(Duration::from_secs(30))
        .fetch(&url, &repo_dir)
        .await
        .unwrap();
    assert!(repo_dir.join(".git").is_dir());
    assert!(repo_dir.join("disk.json").is_file());
}
