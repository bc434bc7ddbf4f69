use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

/// Errors raised by the state repository
#[derive(Error, Debug)]
pub enum GitError {
    /// Invalid repository settings. The repository is never created.
    #[error("{0}")]
    Configuration(String),

    /// Clone/fetch/reset failed while bringing up the working copy
    #[error("Error initializing state repository: {source}")]
    Initialization {
        #[source]
        source: Box<GitError>,
    },

    #[error("git {args:?} failed ({status}): {stderr}")]
    Exec {
        args: Vec<String>,
        status: ExitStatus,
        stdout: String,
        stderr: String,
    },

    #[error("git {args:?} timed out after {timeout:?}")]
    Timeout { args: Vec<String>, timeout: Duration },

    #[error("Failed to run git {args:?}: {source}")]
    Spawn {
        args: Vec<String>,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GitError {
    pub(crate) fn initialization(source: GitError) -> Self {
        GitError::Initialization {
            source: Box::new(source),
        }
    }

    /// Combined process output, if this error came from a completed git process
    pub fn output(&self) -> Option<String> {
        match self {
            GitError::Exec { stdout, stderr, .. } => Some(format!("{}\n{}", stdout, stderr)),
            _ => None,
        }
    }
}
