//! Commit rendered files to the state repository

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::{error, warn};

use crate::core::ResourceFile;
use crate::git::{CommitOutcome, GitError, StateRepo};

/// Durably records a set of rendered files
#[async_trait]
pub trait Committer: Send + Sync {
    async fn commit(
        &self,
        message: &str,
        files: &[ResourceFile],
    ) -> Result<CommitOutcome, GitError>;
}

/// Commits and pushes through the state repository
pub struct GitCommitter {
    repo: Arc<StateRepo>,
}

impl GitCommitter {
    pub fn new(repo: Arc<StateRepo>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl Committer for GitCommitter {
    /// Commit and push under a single lock. On failure the working copy is
    /// reset to the remote so the next write starts from a known state.
    async fn commit(
        &self,
        message: &str,
        files: &[ResourceFile],
    ) -> Result<CommitOutcome, GitError> {
        let txn = self.repo.lock().await;

        let result = match txn.commit(message, files).await {
            Ok(CommitOutcome::NoChanges) => return Ok(CommitOutcome::NoChanges),
            Ok(CommitOutcome::Committed) => txn.push().await.map(|_| CommitOutcome::Committed),
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            warn!("Commit {:?} failed, resetting to remote: {}", message, e);
            if let Err(reset_err) = txn.reset_hard_remote().await {
                error!("Failed to reset state repository after error: {}", reset_err);
            }
        }

        result
    }
}

/// Records what would have been committed without touching git
#[derive(Default)]
pub struct DryRunCommitter {
    commits: Mutex<Vec<DryRunCommit>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DryRunCommit {
    pub message: String,
    pub files: Vec<ResourceFile>,
}

impl DryRunCommitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commits(&self) -> Vec<DryRunCommit> {
        self.commits
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl Committer for DryRunCommitter {
    async fn commit(
        &self,
        message: &str,
        files: &[ResourceFile],
    ) -> Result<CommitOutcome, GitError> {
        self.commits
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(DryRunCommit {
                message: message.to_string(),
                files: files.to_vec(),
            });
        Ok(CommitOutcome::Committed)
    }
}
