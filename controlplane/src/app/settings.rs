//! Settings file management

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::app::options::{AppOptions, DeploymentSeed, ServerOptions};
use crate::errors::ServerError;
use crate::git::{GitError, RepoSettings};
use crate::logs::LogLevel;

pub const ENV_GIT_URL: &str = "RISER_GIT_URL";
pub const ENV_GIT_SSH_KEY_PATH: &str = "RISER_GIT_SSH_KEY_PATH";
pub const ENV_GIT_DIR: &str = "RISER_GIT_DIR";
pub const ENV_GIT_BRANCH: &str = "RISER_GIT_BRANCH";
pub const ENV_BIND_ADDRESS: &str = "RISER_BIND_ADDRESS";
pub const ENV_LOG_LEVEL: &str = "RISER_LOG_LEVEL";
pub const ENV_STAGES: &str = "RISER_STAGES";
pub const ENV_DEPLOYMENTS: &str = "RISER_DEPLOYMENTS";

/// Control plane settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Emit logs as JSON
    #[serde(default)]
    pub json_logs: bool,

    /// State repository configuration
    #[serde(default)]
    pub git: GitSettings,

    /// Address the HTTP server binds to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Stages that accept deployments
    #[serde(default)]
    pub stages: Vec<String>,

    /// Deployments that accept rollouts
    #[serde(default)]
    pub deployments: Vec<DeploymentSeed>,
}

fn default_bind_address() -> String {
    "0.0.0.0:8000".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            json_logs: false,
            git: GitSettings::default(),
            bind_address: default_bind_address(),
            stages: Vec::new(),
            deployments: Vec::new(),
        }
    }
}

/// State repository settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitSettings {
    /// Remote URL (ssh or https)
    #[serde(default)]
    pub url: String,

    /// Private key for ssh remotes
    #[serde(default)]
    pub ssh_key_path: Option<PathBuf>,

    #[serde(default = "default_git_branch")]
    pub branch: String,

    /// Local working copy
    #[serde(default = "default_git_dir")]
    pub dir: PathBuf,
}

fn default_git_branch() -> String {
    "main".to_string()
}

fn default_git_dir() -> PathBuf {
    PathBuf::from("/tmp/riser/git/")
}

impl Default for GitSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            ssh_key_path: None,
            branch: default_git_branch(),
            dir: default_git_dir(),
        }
    }
}

impl Settings {
    /// Apply `RISER_*` overrides from the process environment
    pub fn with_env_overrides(self) -> Result<Self, ServerError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup. Unset or empty values keep
    /// the current setting.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ServerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_GIT_URL) {
            self.git.url = url;
        }
        if let Some(path) = get(ENV_GIT_SSH_KEY_PATH) {
            self.git.ssh_key_path = Some(PathBuf::from(path));
        }
        if let Some(dir) = get(ENV_GIT_DIR) {
            self.git.dir = PathBuf::from(dir);
        }
        if let Some(branch) = get(ENV_GIT_BRANCH) {
            self.git.branch = branch;
        }
        if let Some(addr) = get(ENV_BIND_ADDRESS) {
            self.bind_address = addr;
        }
        if let Some(level) = get(ENV_LOG_LEVEL) {
            self.log_level = level.parse().map_err(ServerError::ConfigError)?;
        }
        if let Some(stages) = get(ENV_STAGES) {
            self.stages = stages
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(deployments) = get(ENV_DEPLOYMENTS) {
            self.deployments = deployments
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| s.parse().map_err(ServerError::ConfigError))
                .collect::<Result<_, _>>()?;
        }

        Ok(self)
    }

    /// Validated repository settings
    pub fn repo_settings(&self) -> Result<RepoSettings, GitError> {
        if self.git.url.is_empty() {
            return Err(GitError::Configuration(format!(
                "A git url is required (set {})",
                ENV_GIT_URL
            )));
        }
        RepoSettings::new(
            &self.git.url,
            self.git.ssh_key_path.clone(),
            &self.git.branch,
            &self.git.dir,
        )
    }

    pub fn server_options(&self) -> ServerOptions {
        ServerOptions {
            bind_address: self.bind_address.clone(),
        }
    }

    pub fn app_options(&self) -> AppOptions {
        AppOptions {
            server: self.server_options(),
            stages: self.stages.clone(),
            deployments: self.deployments.clone(),
            ..Default::default()
        }
    }
}
