//! Transports that bring the remote rule repository into the local cache.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{SyncError, SyncResult};

/// Brings `source` into `repo_dir`, creating or updating the checkout.
#[async_trait]
pub trait RuleFetcher: Send + Sync {
    async fn fetch(&self, source: &str, repo_dir: &Path) -> SyncResult<()>;

    /// Short transport name for logs.
    fn name(&self) -> &str;
}

/// Fetches rules with the `git` command line.
///
/// Clones when `repo_dir` has no checkout yet, otherwise pulls.
pub struct GitFetcher {
    timeout: Duration,
}

impl GitFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn git(&self, args: &[&str]) -> SyncResult<()> {
        let command = format!("git {}", args.join(" "));
        debug!(command = %command, timeout_secs = self.timeout.as_secs(), "running git");

        let child = Command::new("git")
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SyncError::Spawn {
                command: command.clone(),
                source,
            })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Err(SyncError::Io(e)),
            Err(_) => {
                warn!(command = %command, timeout_secs = self.timeout.as_secs(), "git timed out");
                return Err(SyncError::Timeout {
                    command,
                    timeout: self.timeout,
                });
            }
        };

        if !output.status.success() {
            return Err(SyncError::Command {
                command,
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RuleFetcher for GitFetcher {
    async fn fetch(&self, source: &str, repo_dir: &Path) -> SyncResult<()> {
        if is_checkout(repo_dir) {
            let dir = repo_dir.to_string_lossy();
            return self.git(&["-C", &dir, "pull"]).await;
        }

        // Clone next to the cache and move it into place only on success, so
        // an interrupted clone never leaves a half-populated checkout behind.
        let staging = staging_dir(repo_dir);
        if let Some(parent) = repo_dir.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        remove_if_present(&staging).await?;

        let staging_str = staging.to_string_lossy();
        if let Err(e) = self.git(&["clone", source, &staging_str]).await {
            if let Err(cleanup) = remove_if_present(&staging).await {
                debug!(path = %staging.display(), error = %cleanup, "failed to remove partial clone");
            }
            return Err(e);
        }

        if repo_dir.exists() {
            warn!(path = %repo_dir.display(), "replacing rule cache that is not a git checkout");
            remove_if_present(repo_dir).await?;
        }
        tokio::fs::rename(&staging, repo_dir).await?;
        Ok(())
    }

    fn name(&self) -> &str {
        "git"
    }
}

fn is_checkout(repo_dir: &Path) -> bool {
    repo_dir.join(".git").exists()
}

/// Sibling of `repo_dir` used as the clone target, e.g. `remote_repo.partial`.
fn staging_dir(repo_dir: &Path) -> PathBuf {
    let mut name = repo_dir
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "remote_repo".into());
    name.push(".partial");
    repo_dir.with_file_name(name)
}

async fn remove_if_present(path: &Path) -> std::io::Result<()> {
    match tokio::fs::remove_dir_all(path).await {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
