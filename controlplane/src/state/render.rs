//! Maps resources onto the canonical file layout of the state repository.
//!
//! Rendering is pure: identical input always produces identical paths and
//! bytes, which is what lets a commit of unchanged state come back empty.

use crate::core::{DeploymentConfig, NamespacedName, ResourceFile};
use crate::errors::ServerError;
use crate::state::resources::{KubeResource, SealedSecret};

/// Render generic resources (e.g. namespaces) into the root of their namespace folder
pub fn render_generic(
    stage: &str,
    resources: &[&dyn KubeResource],
) -> Result<Vec<ResourceFile>, ServerError> {
    render_kube_resources(|resource| generic_resource_path(stage, resource), resources)
}

/// Render a sealed secret into the secrets folder of its app
pub fn render_sealed_secret(
    app: &str,
    stage: &str,
    sealed_secret: &SealedSecret,
) -> Result<Vec<ResourceFile>, ServerError> {
    render_kube_resources(
        |resource| secret_path(app, stage, resource),
        &[sealed_secret as &dyn KubeResource],
    )
}

/// Render resources owned by a deployment
pub fn render_deployment_resources(
    stage: &str,
    deployment: &NamespacedName,
    resources: &[&dyn KubeResource],
) -> Result<Vec<ResourceFile>, ServerError> {
    render_kube_resources(
        |resource| deployment_path(stage, deployment, resource),
        resources,
    )
}

/// Render a deployment's resources plus its app config document
pub fn render_deployment(
    deployment: &DeploymentConfig,
    resources: &[&dyn KubeResource],
) -> Result<Vec<ResourceFile>, ServerError> {
    let name = NamespacedName::new(&deployment.name, &deployment.namespace);
    let mut files = render_deployment_resources(&deployment.stage, &name, resources)?;
    files.push(render_app_config(deployment)?);
    Ok(files)
}

fn render_app_config(deployment: &DeploymentConfig) -> Result<ResourceFile, ServerError> {
    let serialized = serde_yaml::to_string(&deployment.app)?;
    Ok(ResourceFile::new(app_config_path(deployment), serialized))
}

fn render_kube_resources<F>(
    path_fn: F,
    resources: &[&dyn KubeResource],
) -> Result<Vec<ResourceFile>, ServerError>
where
    F: Fn(&dyn KubeResource) -> String,
{
    resources
        .iter()
        .map(|resource| -> Result<ResourceFile, ServerError> {
            let serialized = resource.to_yaml()?;
            Ok(ResourceFile::new(path_fn(*resource), serialized))
        })
        .collect()
}

// ===================================== PATHS ===================================== //

/// Lower-cased `/`-joined path; empty segments are skipped
fn join_lower(segments: &[&str]) -> String {
    segments
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("/")
        .to_lowercase()
}

fn platform_resources_root(stage: &str) -> String {
    join_lower(&["stages", stage, "kube-resources", "riser-managed"])
}

fn file_name(resource: &dyn KubeResource) -> String {
    format!("{}.{}.yaml", resource.kind(), resource.name()).to_lowercase()
}

fn generic_resource_path(stage: &str, resource: &dyn KubeResource) -> String {
    join_lower(&[
        &platform_resources_root(stage),
        resource.namespace(),
        &file_name(resource),
    ])
}

fn secret_path(app: &str, stage: &str, resource: &dyn KubeResource) -> String {
    join_lower(&[
        &platform_resources_root(stage),
        resource.namespace(),
        "secrets",
        app,
        &file_name(resource),
    ])
}

fn deployment_path(stage: &str, deployment: &NamespacedName, resource: &dyn KubeResource) -> String {
    join_lower(&[
        &platform_resources_root(stage),
        &deployment.namespace,
        "deployments",
        &deployment.name,
        &file_name(resource),
    ])
}

fn app_config_path(deployment: &DeploymentConfig) -> String {
    join_lower(&[
        "stages",
        &deployment.stage,
        "configs",
        &deployment.namespace,
        &deployment.app.name,
        &format!("{}.yaml", deployment.name),
    ])
}
