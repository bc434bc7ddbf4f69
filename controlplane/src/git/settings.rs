//! Repository settings

use std::path::{Path, PathBuf};

use crate::git::GitError;

/// Where the state repository lives and how to reach it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSettings {
    url: String,
    ssh_key_path: Option<PathBuf>,
    branch: String,
    local_git_dir: PathBuf,
}

impl RepoSettings {
    /// Validate and build repository settings.
    ///
    /// An SSH key can only be combined with an SSH remote, and the key file
    /// must exist. Nothing touches the network or the working directory here.
    pub fn new(
        url: impl Into<String>,
        ssh_key_path: Option<PathBuf>,
        branch: impl Into<String>,
        local_git_dir: impl Into<PathBuf>,
    ) -> Result<Self, GitError> {
        let url = url.into();
        let ssh_key_path = ssh_key_path.filter(|p| !p.as_os_str().is_empty());

        if let Some(key_path) = &ssh_key_path {
            if url.to_lowercase().starts_with("https://") {
                return Err(GitError::Configuration(
                    "Cannot use both an https git url and specify an SSH key. Either use an SSH url or remove the key"
                        .to_string(),
                ));
            }

            std::fs::metadata(key_path).map_err(|e| {
                GitError::Configuration(format!(
                    "Error reading ssh key {}: {}",
                    key_path.display(),
                    e
                ))
            })?;
        }

        Ok(Self {
            url,
            ssh_key_path,
            branch: branch.into(),
            local_git_dir: local_git_dir.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn ssh_key_path(&self) -> Option<&Path> {
        self.ssh_key_path.as_deref()
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn local_git_dir(&self) -> &Path {
        &self.local_git_dir
    }
}
