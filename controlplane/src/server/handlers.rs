//! HTTP request handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use openapi_server::models::{
    ApiResponse, DeploymentStatusMutable, DeploymentStatusView, HealthResponse, RolloutRequest,
    VersionResponse,
};
use serde::Deserialize;

use crate::core::NamespacedName;
use crate::errors::ServerError;
use crate::rollout::RolloutOutcome;
use crate::server::state::ServerState;
use crate::storage::validate_deployable;
use crate::utils::version_info;

/// Path parameters addressing one deployment in one stage
#[derive(Debug, Deserialize)]
pub struct DeploymentPath {
    pub stage: String,
    pub namespace: String,
    pub deployment: String,
}

impl DeploymentPath {
    fn name(&self) -> NamespacedName {
        NamespacedName::new(&self.deployment, &self.namespace)
    }
}

/// Health check handler
pub async fn health_handler() -> impl IntoResponse {
    let version = version_info();
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "riserd".to_string(),
        version: version.version,
    })
}

/// Version handler
pub async fn version_handler() -> impl IntoResponse {
    let version = version_info();
    Json(VersionResponse {
        version: version.version,
        git_hash: version.git_hash,
        build_time: version.build_time,
    })
}

/// Replace the traffic split of a deployment
pub async fn rollout_handler(
    State(state): State<Arc<ServerState>>,
    Path(path): Path<DeploymentPath>,
    Json(request): Json<RolloutRequest>,
) -> Result<Json<ApiResponse>, ServerError> {
    // An unknown stage is reported before any rule errors
    validate_deployable(state.stages.as_ref(), &path.stage).await?;

    let outcome = state
        .rollouts
        .rollout(
            &path.name(),
            &path.stage,
            &request,
            state.committer.as_ref(),
        )
        .await?;

    let message = match outcome {
        RolloutOutcome::Updated => "Rollout updated",
        RolloutOutcome::NoChanges => "No changes to rollout",
    };
    Ok(Json(ApiResponse {
        message: message.to_string(),
    }))
}

/// Current status of a deployment
pub async fn get_status_handler(
    State(state): State<Arc<ServerState>>,
    Path(path): Path<DeploymentPath>,
) -> Result<Json<DeploymentStatusView>, ServerError> {
    let view = state.statuses.get_status(&path.name(), &path.stage).await?;
    Ok(Json(view))
}

/// Status report from the cluster
pub async fn put_status_handler(
    State(state): State<Arc<ServerState>>,
    Path(path): Path<DeploymentPath>,
    Json(report): Json<DeploymentStatusMutable>,
) -> Result<Json<ApiResponse>, ServerError> {
    state
        .statuses
        .update_status(&path.name(), &path.stage, &report)
        .await?;
    Ok(Json(ApiResponse {
        message: "Status updated".to_string(),
    }))
}
