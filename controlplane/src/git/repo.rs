//! Lock-protected working copy of the state repository

use std::path::{Component, Path};
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::core::ResourceFile;
use crate::filesys::dir::Dir;
use crate::filesys::file::File;
use crate::git::{GitCli, GitError, GitOutput, GitRunner, RepoSettings};

/// Synthetic identity used for every commit
pub const COMMIT_NAME: &str = "riser-server";
pub const COMMIT_EMAIL: &str = "riser-server@tempuri.org";

const REMOTE_NAME: &str = "origin";

const NO_CHANGES_MARKERS: [&str; 3] = [
    "nothing to commit",
    "nothing added to commit",
    "no changes added to commit",
];

/// Result of a commit attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// A new commit was created
    Committed,

    /// The rendered files matched the working copy; nothing was committed
    NoChanges,
}

/// The single local working copy of the remote state repository.
///
/// There must only be one instance per working directory. Any pending changes
/// or local commits found there are discarded when the repository is opened.
pub struct StateRepo {
    settings: RepoSettings,
    runner: Arc<dyn GitRunner>,
    lock: Mutex<()>,
}

impl StateRepo {
    /// Open the repository, cloning or resetting the working copy to the remote branch
    pub async fn open(settings: RepoSettings) -> Result<Self, GitError> {
        let runner = Arc::new(GitCli::new(
            settings.ssh_key_path().map(Path::to_path_buf),
        ));
        Self::open_with_runner(settings, runner).await
    }

    /// Open the repository using a custom git runner
    pub async fn open_with_runner(
        settings: RepoSettings,
        runner: Arc<dyn GitRunner>,
    ) -> Result<Self, GitError> {
        let repo = Self {
            settings,
            runner,
            lock: Mutex::new(()),
        };

        repo.init().await.map_err(GitError::initialization)?;
        Ok(repo)
    }

    pub fn settings(&self) -> &RepoSettings {
        &self.settings
    }

    /// Acquire exclusive access to the working copy. The lock is released when
    /// the returned transaction is dropped.
    pub async fn lock(&self) -> RepoTxn<'_> {
        RepoTxn {
            repo: self,
            _guard: self.lock.lock().await,
        }
    }

    /// Write `files`, stage everything, and commit under the repository lock
    pub async fn commit(
        &self,
        message: &str,
        files: &[ResourceFile],
    ) -> Result<CommitOutcome, GitError> {
        self.lock().await.commit(message, files).await
    }

    /// Push the current branch under the repository lock
    pub async fn push(&self) -> Result<(), GitError> {
        self.lock().await.push().await
    }

    /// Discard local state and realign with the remote branch under the repository lock
    pub async fn reset_hard_remote(&self) -> Result<(), GitError> {
        self.lock().await.reset_hard_remote().await
    }

    async fn init(&self) -> Result<(), GitError> {
        let _guard = self.lock.lock().await;

        let dir = Dir::new(self.settings.local_git_dir());
        dir.create().await?;

        if dir.is_empty().await? {
            return self.clone_remote().await;
        }

        // A non-empty working copy is left over from an earlier process. Anything it
        // did not push is treated as an aborted transaction.
        info!(
            "Reusing existing working copy at {}",
            self.settings.local_git_dir().display()
        );
        self.fetch().await?;
        self.clean().await?;
        self.reset_to_remote().await
    }

    async fn clone_remote(&self) -> Result<(), GitError> {
        info!(
            "Cloning {} (branch: {}) to {}",
            self.settings.url(),
            self.settings.branch(),
            self.settings.local_git_dir().display()
        );
        self.exec(&[
            "clone",
            "--branch",
            self.settings.branch(),
            "--single-branch",
            "--depth=1",
            self.settings.url(),
            ".",
        ])
        .await?;
        Ok(())
    }

    async fn fetch(&self) -> Result<(), GitError> {
        self.exec(&["fetch", "-f", REMOTE_NAME, self.settings.branch()])
            .await?;
        Ok(())
    }

    async fn clean(&self) -> Result<(), GitError> {
        self.exec(&["clean", "-xdf"]).await?;
        Ok(())
    }

    async fn reset_to_remote(&self) -> Result<(), GitError> {
        let remote_ref = format!("{}/{}", REMOTE_NAME, self.settings.branch());
        self.exec(&["reset", "--hard", &remote_ref]).await?;
        Ok(())
    }

    async fn write_files(&self, files: &[ResourceFile]) -> Result<(), GitError> {
        for file in files {
            validate_relative_path(&file.name)?;
        }

        let root = self.settings.local_git_dir();
        for file in files {
            debug!("Writing {}", file.name);
            File::new(root.join(&file.name))
                .write_bytes(&file.contents)
                .await?;
        }
        Ok(())
    }

    async fn exec(&self, args: &[&str]) -> Result<GitOutput, GitError> {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        self.runner
            .run(self.settings.local_git_dir(), &args)
            .await
    }
}

/// Exclusive access to the working copy.
///
/// Lets callers chain read-decide-commit sequences atomically. Dropping the
/// transaction releases the lock on every exit path.
pub struct RepoTxn<'a> {
    repo: &'a StateRepo,
    _guard: MutexGuard<'a, ()>,
}

impl RepoTxn<'_> {
    /// Write `files`, stage everything, and commit with the synthetic author.
    ///
    /// Returns [`CommitOutcome::NoChanges`] when the working copy already
    /// matches the files.
    pub async fn commit(
        &self,
        message: &str,
        files: &[ResourceFile],
    ) -> Result<CommitOutcome, GitError> {
        self.repo.write_files(files).await?;
        self.repo.exec(&["add", "--all"]).await?;

        let author = format!("{} <{}>", COMMIT_NAME, COMMIT_EMAIL);
        let user_name = format!("user.name={}", COMMIT_NAME);
        let user_email = format!("user.email={}", COMMIT_EMAIL);
        let result = self
            .repo
            .exec(&[
                "-c",
                &user_name,
                "-c",
                &user_email,
                "commit",
                "-m",
                message,
                "--author",
                &author,
            ])
            .await;

        match result {
            Ok(_) => {
                info!("Committed {} file(s): {}", files.len(), message);
                Ok(CommitOutcome::Committed)
            }
            Err(e) if is_no_changes(&e) => {
                debug!("No changes to commit: {}", message);
                Ok(CommitOutcome::NoChanges)
            }
            Err(e) => Err(e),
        }
    }

    /// Push the branch to the remote. Never retried.
    pub async fn push(&self) -> Result<(), GitError> {
        info!("Pushing to {}/{}", REMOTE_NAME, self.repo.settings.branch());
        self.repo
            .exec(&["push", REMOTE_NAME, self.repo.settings.branch()])
            .await?;
        Ok(())
    }

    /// Fetch, then hard reset to the remote branch tip and drop untracked files.
    /// Local commits that were not pushed are lost.
    pub async fn reset_hard_remote(&self) -> Result<(), GitError> {
        info!(
            "Resetting working copy to {}/{}",
            REMOTE_NAME,
            self.repo.settings.branch()
        );
        self.repo.fetch().await?;
        self.repo.reset_to_remote().await?;
        self.repo.clean().await
    }
}

fn is_no_changes(err: &GitError) -> bool {
    err.output()
        .map(|output| NO_CHANGES_MARKERS.iter().any(|m| output.contains(m)))
        .unwrap_or(false)
}

fn validate_relative_path(name: &str) -> Result<(), GitError> {
    let path = Path::new(name);
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));

    if name.is_empty() || escapes {
        return Err(GitError::Configuration(format!(
            "Invalid resource path {:?}: must be relative to the repository root",
            name
        )));
    }
    Ok(())
}
