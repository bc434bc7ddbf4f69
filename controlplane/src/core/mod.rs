//! Domain types shared by the rollout, rendering, and status layers

pub mod deployment;
pub mod names;
pub mod resource_file;
pub mod stage;

pub use deployment::{
    AppConfig, Deployment, DeploymentConfig, DeploymentDoc,
    DeploymentRevisionStatus, DeploymentStatus, DeploymentTrafficStatus, StatusProblem,
    TrafficConfig, TrafficConfigRule,
};
pub use names::NamespacedName;
pub use resource_file::ResourceFile;
pub use stage::{Stage, StageDoc};
