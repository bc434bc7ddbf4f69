//! Control plane API models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Version response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionResponse {
    pub version: String,
    pub git_hash: String,
    pub build_time: String,
}

/// Generic message response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub message: String,
}

/// A single field-level violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrorModel {
    pub field: String,
    pub message: String,
}

/// Error payload returned for rejected requests
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub message: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation_errors: Vec<FieldErrorModel>,
}

// =================================== ROLLOUT ===================================== //

/// Desired traffic split for a deployment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RolloutRequest {
    #[serde(default)]
    pub traffic: Vec<TrafficRule>,
}

/// Percentage of traffic routed to one revision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficRule {
    /// Absent when the client omitted the field
    #[serde(default)]
    pub riser_revision: Option<i64>,

    #[serde(default)]
    pub percent: i32,
}

impl TrafficRule {
    pub fn new(riser_revision: i64, percent: i32) -> Self {
        Self {
            riser_revision: Some(riser_revision),
            percent,
        }
    }
}

// =================================== STATUS ====================================== //

/// Status document reported by the in-cluster agent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentStatusMutable {
    #[serde(default)]
    pub observed_riser_revision: i64,

    #[serde(default)]
    pub latest_ready_revision_name: String,

    #[serde(default)]
    pub latest_created_revision_name: String,

    #[serde(default)]
    pub revisions: Vec<DeploymentRevisionStatus>,

    #[serde(default)]
    pub traffic: Vec<DeploymentTrafficStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRevisionStatus {
    pub name: String,

    #[serde(default)]
    pub available_replicas: i32,

    #[serde(default)]
    pub docker_image: String,

    #[serde(default)]
    pub riser_revision: i64,

    #[serde(default)]
    pub rollout_status: String,

    #[serde(default)]
    pub rollout_status_reason: String,

    #[serde(default)]
    pub problems: Vec<StatusProblem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusProblem {
    pub count: i32,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentTrafficStatus {
    /// Absent for revisions without a traffic allocation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<i64>,

    pub revision_name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tag: String,
}

/// Status of a deployment as exposed to API clients
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentStatusView {
    pub deployment_name: String,
    pub stage_name: String,

    /// Revision most recently requested for this deployment
    pub riser_revision: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,

    #[serde(flatten)]
    pub status: DeploymentStatusMutable,
}
