//! External git process invocation

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::git::GitError;

/// Upper bound for any single git invocation
pub const GIT_EXEC_TIMEOUT: Duration = Duration::from_secs(30);

/// Captured output of a successful git invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs git commands. Swappable so repository logic can be tested without git.
#[async_trait]
pub trait GitRunner: Send + Sync {
    /// Run `git <args>` with `dir` as the working directory
    async fn run(&self, dir: &Path, args: &[String]) -> Result<GitOutput, GitError>;
}

/// Runs the `git` executable found on the PATH
#[derive(Debug, Clone)]
pub struct GitCli {
    ssh_key_path: Option<PathBuf>,
    timeout: Duration,
}

impl GitCli {
    pub fn new(ssh_key_path: Option<PathBuf>) -> Self {
        Self {
            ssh_key_path,
            timeout: GIT_EXEC_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the command without running it
    pub fn build_command(&self, dir: &Path, args: &[String]) -> Command {
        let mut cmd = Command::new("git");
        cmd.current_dir(dir)
            .args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            // Output is matched against English messages
            .env("LC_ALL", "C")
            .env("LANGUAGE", "")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(key_path) = &self.ssh_key_path {
            cmd.env(
                "GIT_SSH_COMMAND",
                format!(
                    "ssh -i {} -o IdentitiesOnly=yes -o StrictHostKeyChecking=accept-new",
                    key_path.display()
                ),
            );
        }

        cmd
    }
}

#[async_trait]
impl GitRunner for GitCli {
    async fn run(&self, dir: &Path, args: &[String]) -> Result<GitOutput, GitError> {
        debug!("Running git {:?} in {}", args, dir.display());

        let mut cmd = self.build_command(dir, args);
        // The child is killed when the timed out future is dropped
        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(GitError::Spawn {
                    args: args.to_vec(),
                    source: e,
                })
            }
            Err(_) => {
                return Err(GitError::Timeout {
                    args: args.to_vec(),
                    timeout: self.timeout,
                })
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(GitError::Exec {
                args: args.to_vec(),
                status: output.status,
                stdout,
                stderr,
            });
        }

        Ok(GitOutput { stdout, stderr })
    }
}
