//! Riser control plane library
//!
//! Keeps the desired-state git repository in sync with deployment rollouts
//! and reconciles status reported back from the clusters.

pub mod app;
pub mod core;
pub mod errors;
pub mod filesys;
pub mod git;
pub mod logs;
pub mod rollout;
pub mod server;
pub mod state;
pub mod status;
pub mod storage;
pub mod utils;
