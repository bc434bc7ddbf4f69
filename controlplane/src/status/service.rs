//! Status ingestion and lookup on top of the side-store

use std::sync::Arc;

use openapi_server::models::{DeploymentStatusMutable, DeploymentStatusView};
use tracing::debug;

use crate::core::{DeploymentStatus, NamespacedName};
use crate::errors::ServerError;
use crate::status::reconciler::{map_deployment_to_status_view, map_status_from_report};
use crate::storage::DeploymentRepository;

pub struct StatusService {
    deployments: Arc<dyn DeploymentRepository>,
}

impl StatusService {
    pub fn new(deployments: Arc<dyn DeploymentRepository>) -> Self {
        Self { deployments }
    }

    /// Replace the stored status with the reported one
    pub async fn update_status(
        &self,
        name: &NamespacedName,
        stage: &str,
        report: &DeploymentStatusMutable,
    ) -> Result<DeploymentStatus, ServerError> {
        let status = map_status_from_report(report);
        self.deployments.update_status(name, stage, &status).await?;
        debug!(
            "Stored status for {} in stage {} (observed revision {})",
            name, stage, status.observed_riser_revision
        );
        Ok(status)
    }

    pub async fn get_status(
        &self,
        name: &NamespacedName,
        stage: &str,
    ) -> Result<DeploymentStatusView, ServerError> {
        let deployment = self.deployments.get(name, stage).await?;
        Ok(map_deployment_to_status_view(&deployment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::fakes::FakeDeploymentRepository;

    #[tokio::test]
    async fn test_update_status_unknown_deployment() {
        let repo = Arc::new(FakeDeploymentRepository {
            update_status_fn: Some(Box::new(|name, _, _| {
                Err(ServerError::NotFound(name.to_string()))
            })),
            ..Default::default()
        });
        let service = StatusService::new(repo.clone());

        let result = service
            .update_status(
                &NamespacedName::new("missing", "apps"),
                "dev",
                &DeploymentStatusMutable::default(),
            )
            .await;

        assert!(matches!(result, Err(ServerError::NotFound(_))));
        assert_eq!(repo.update_status_calls(), 1);
    }
}
