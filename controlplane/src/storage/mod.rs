//! Side-store interfaces for deployment and stage records
//!
//! Status and traffic live here rather than in the state repository. The core
//! only needs get/put style access keyed by deployment identity.

pub mod codec;
pub mod fakes;
pub mod memory;

use async_trait::async_trait;

use crate::core::{Deployment, DeploymentStatus, NamespacedName, Stage, TrafficConfig};
use crate::errors::ServerError;
use crate::rollout::ValidationErrors;

#[async_trait]
pub trait DeploymentRepository: Send + Sync {
    /// Fails with [`ServerError::NotFound`] for unknown deployments
    async fn get(&self, name: &NamespacedName, stage: &str) -> Result<Deployment, ServerError>;

    async fn list_by_stage(&self, stage: &str) -> Result<Vec<Deployment>, ServerError>;

    async fn save(&self, deployment: &Deployment) -> Result<(), ServerError>;

    /// Replace only the traffic section of the deployment document
    async fn update_traffic(
        &self,
        name: &NamespacedName,
        stage: &str,
        traffic: &TrafficConfig,
    ) -> Result<(), ServerError>;

    /// Replace only the status section of the deployment document
    async fn update_status(
        &self,
        name: &NamespacedName,
        stage: &str,
        status: &DeploymentStatus,
    ) -> Result<(), ServerError>;
}

#[async_trait]
pub trait StageRepository: Send + Sync {
    async fn get(&self, name: &str) -> Result<Stage, ServerError>;

    async fn list(&self) -> Result<Vec<Stage>, ServerError>;

    async fn save(&self, stage: &Stage) -> Result<(), ServerError>;
}

/// Ensure `stage` exists before anything is deployed to it
pub async fn validate_deployable(
    stages: &dyn StageRepository,
    stage: &str,
) -> Result<(), ServerError> {
    match stages.get(stage).await {
        Ok(_) => Ok(()),
        Err(ServerError::NotFound(_)) => {
            let mut names: Vec<String> = stages
                .list()
                .await?
                .into_iter()
                .map(|s| s.name)
                .collect();
            names.sort();

            let mut errors = ValidationErrors::new();
            errors.push(
                "stage",
                format!(
                    "Invalid stage \"{}\". Must be one of: {}",
                    stage,
                    names.join(", ")
                ),
            );
            Err(ServerError::Validation(errors))
        }
        Err(e) => Err(e),
    }
}
