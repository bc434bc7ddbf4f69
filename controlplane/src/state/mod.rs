//! Desired state rendering and committing

pub mod committer;
pub mod render;
pub mod resources;

pub use committer::{Committer, DryRunCommit, DryRunCommitter, GitCommitter};
pub use render::{
    render_deployment, render_deployment_resources, render_generic, render_sealed_secret,
};
pub use resources::{KubeResource, Manifest, Namespace, ObjectMeta, Route, SealedSecret};
