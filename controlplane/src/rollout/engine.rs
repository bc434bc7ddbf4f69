//! Rollout engine
//!
//! A rollout rewrites a deployment's Route in the state repository and then
//! records the new split in the side-store. The store is only written once the
//! commit has landed (or was a no-op), so the two never disagree about a
//! rollout that failed to reach git. Updates are serialized so the last
//! commit and the last store write always come from the same rollout.

use std::sync::Arc;

use openapi_server::models::{RolloutRequest, TrafficRule};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::core::{NamespacedName, TrafficConfig, TrafficConfigRule};
use crate::errors::ServerError;
use crate::git::CommitOutcome;
use crate::rollout::validation::validate_rollout_request;
use crate::state::{render_deployment_resources, Committer, KubeResource, Route};
use crate::storage::DeploymentRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolloutOutcome {
    Updated,
    /// The rendered route was identical to what the repository already holds
    NoChanges,
}

/// Map validated API rules onto domain traffic rules. Revision names follow the
/// `<deployment>-<riserRevision>` convention.
pub fn map_traffic_rules_to_domain(deployment_name: &str, rules: &[TrafficRule]) -> TrafficConfig {
    rules
        .iter()
        .map(|rule| {
            let riser_revision = rule.riser_revision.unwrap_or_default();
            TrafficConfigRule {
                riser_revision,
                revision_name: format!("{}-{}", deployment_name, riser_revision),
                percent: rule.percent,
            }
        })
        .collect::<Vec<_>>()
        .into()
}

pub struct RolloutEngine {
    deployments: Arc<dyn DeploymentRepository>,
    /// Held from lookup until the store write
    update_lock: Mutex<()>,
}

impl RolloutEngine {
    pub fn new(deployments: Arc<dyn DeploymentRepository>) -> Self {
        Self {
            deployments,
            update_lock: Mutex::new(()),
        }
    }

    /// Validate a request and apply it. Invalid requests never reach the
    /// repository or the store.
    pub async fn rollout(
        &self,
        name: &NamespacedName,
        stage: &str,
        request: &RolloutRequest,
        committer: &dyn Committer,
    ) -> Result<RolloutOutcome, ServerError> {
        validate_rollout_request(request)?;

        let traffic = map_traffic_rules_to_domain(&name.name, &request.traffic);
        let message = format!(
            "Updating resources for \"{}\" in stage \"{}\"",
            name, stage
        );
        self.update_traffic(name, stage, traffic, &message, committer)
            .await
    }

    /// Commit a new Route for the deployment, then persist the traffic split.
    pub async fn update_traffic(
        &self,
        name: &NamespacedName,
        stage: &str,
        traffic: TrafficConfig,
        message: &str,
        committer: &dyn Committer,
    ) -> Result<RolloutOutcome, ServerError> {
        let _guard = self.update_lock.lock().await;

        let deployment = self.deployments.get(name, stage).await?;

        let route = Route::new(name, &deployment.app_name, &traffic);
        let files = render_deployment_resources(stage, name, &[&route as &dyn KubeResource])?;

        let outcome = committer.commit(message, &files).await?;

        self.deployments
            .update_traffic(name, stage, &traffic)
            .await?;

        match outcome {
            CommitOutcome::Committed => {
                info!("Updated traffic for {} in stage {}", name, stage);
                Ok(RolloutOutcome::Updated)
            }
            CommitOutcome::NoChanges => {
                debug!("Traffic for {} in stage {} already up to date", name, stage);
                Ok(RolloutOutcome::NoChanges)
            }
        }
    }
}
