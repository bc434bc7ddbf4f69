//! Versioned state repository
//!
//! Owns one local working copy of the remote state repository. The remote is
//! always the source of truth: local changes that were never pushed are
//! discarded on startup and after a failed push.

pub mod error;
pub mod repo;
pub mod runner;
pub mod settings;

pub use error::GitError;
pub use repo::{CommitOutcome, RepoTxn, StateRepo, COMMIT_EMAIL, COMMIT_NAME};
pub use runner::{GitCli, GitOutput, GitRunner, GIT_EXEC_TIMEOUT};
pub use settings::RepoSettings;
