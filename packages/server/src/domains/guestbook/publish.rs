//! Commit pipeline: materialize an approved entry into the target repository.
//!
//! Every pipeline run works in its own scoped temporary directory with a
//! fresh shallow clone; nothing touches the shared remote until the final
//! push, and the working directory is released on every exit path.

use std::path::Path;

use async_trait::async_trait;
use tempfile::TempDir;
use thiserror::Error;
use tokio::fs;
use tokio::process::Command;
use tracing::debug;

use crate::kernel::traits::BaseContentStore;

/// Commit pipeline failures, one variant per step.
///
/// The first failing step aborts the rest of the pipeline; the remote is
/// never left with partial state because everything before `push` happens in
/// the scoped clone.
#[derive(Debug, Error)]
pub enum CommitError {
    #[error("failed to prepare working directory: {0}")]
    Workdir(#[source] std::io::Error),

    #[error("could not launch git: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("git {step} failed: {stderr}")]
    Git { step: &'static str, stderr: String },

    #[error("failed to place entry {entry}: {source}")]
    Place {
        entry: String,
        #[source]
        source: std::io::Error,
    },
}

/// Commit author identity - the service identity, never a human reviewer.
#[derive(Debug, Clone)]
pub struct GitIdentity {
    pub name: String,
    pub email: String,
}

impl Default for GitIdentity {
    fn default() -> Self {
        Self {
            name: "guestbook-bot".to_string(),
            email: "bot@guestbook.1j.nz".to_string(),
        }
    }
}

/// Git-backed content store: shallow clone, place entry, add/commit/push.
pub struct GitContentStore {
    clone_url: String,
    identity: GitIdentity,
}

impl GitContentStore {
    pub fn new(clone_url: impl Into<String>) -> Self {
        Self {
            clone_url: clone_url.into(),
            identity: GitIdentity::default(),
        }
    }

    pub fn with_identity(mut self, identity: GitIdentity) -> Self {
        self.identity = identity;
        self
    }

    /// Run one git step, treating a non-zero exit as a pipeline failure.
    async fn run_git(workdir: &Path, step: &'static str, args: &[&str]) -> Result<(), CommitError> {
        debug!(step, "running git");
        let output = Command::new("git")
            .args(args)
            .current_dir(workdir)
            .output()
            .await
            .map_err(CommitError::Spawn)?;

        if !output.status.success() {
            return Err(CommitError::Git {
                step,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl BaseContentStore for GitContentStore {
    async fn publish(
        &self,
        attachment: &Path,
        entry_file_name: &str,
        message_id: i64,
    ) -> Result<(), CommitError> {
        // Scoped acquisition: the TempDir is deleted on drop, which covers
        // every failure return below as well as the success path.
        let workdir = TempDir::new().map_err(CommitError::Workdir)?;
        let root = workdir.path();

        Self::run_git(
            root,
            "clone",
            &[
                "clone",
                "--depth",
                "1",
                "--single-branch",
                &self.clone_url,
                ".",
            ],
        )
        .await?;

        let entries = root.join("entries");
        fs::create_dir_all(&entries)
            .await
            .map_err(|source| CommitError::Place {
                entry: entry_file_name.to_string(),
                source,
            })?;
        fs::copy(attachment, entries.join(entry_file_name))
            .await
            .map_err(|source| CommitError::Place {
                entry: entry_file_name.to_string(),
                source,
            })?;
        // The scratch download has served its purpose.
        let _ = fs::remove_file(attachment).await;

        Self::run_git(root, "add", &["add", "-A"]).await?;
        Self::run_git(root, "config", &["config", "user.name", &self.identity.name]).await?;
        Self::run_git(
            root,
            "config",
            &["config", "user.email", &self.identity.email],
        )
        .await?;

        let message = format!("guestbook entry: {message_id}");
        Self::run_git(root, "commit", &["commit", "-m", &message]).await?;
        Self::run_git(root, "push", &["push"]).await?;

        Ok(())
    }
}
