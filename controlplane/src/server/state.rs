//! Server state

use std::sync::Arc;

use crate::rollout::RolloutEngine;
use crate::state::Committer;
use crate::status::StatusService;
use crate::storage::{DeploymentRepository, StageRepository};

/// Server state shared across handlers
pub struct ServerState {
    pub stages: Arc<dyn StageRepository>,
    pub rollouts: RolloutEngine,
    pub statuses: StatusService,
    pub committer: Arc<dyn Committer>,
}

impl ServerState {
    pub fn new(
        deployments: Arc<dyn DeploymentRepository>,
        stages: Arc<dyn StageRepository>,
        committer: Arc<dyn Committer>,
    ) -> Self {
        Self {
            stages,
            rollouts: RolloutEngine::new(deployments.clone()),
            statuses: StatusService::new(deployments),
            committer,
        }
    }
}
