//! Deployment domain model

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A deployment record as kept in the side-store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub name: String,
    pub namespace: String,
    pub stage_name: String,
    pub app_name: String,

    /// Tracks deployment changes. Unrelated to any cluster-side revision counter.
    pub riser_revision: i64,

    pub doc: DeploymentDoc,
}

/// The document persisted per deployment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentDoc {
    /// `None` until the cluster reports status for the first time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DeploymentStatus>,

    #[serde(default)]
    pub traffic: TrafficConfig,
}

/// Everything needed to render a deployment into the state repository
#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentConfig {
    pub name: String,
    pub namespace: String,
    pub stage: String,
    pub app: AppConfig,
}

/// Application configuration document rendered next to the deployment resources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub name: String,
    pub namespace: String,
    pub image: String,

    /// Remaining app settings, kept sorted for deterministic output
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

// ==================================== TRAFFIC ==================================== //

/// Ordered list of traffic rules. Order is preserved but carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrafficConfig(pub Vec<TrafficConfigRule>);

impl TrafficConfig {
    pub fn rules(&self) -> &[TrafficConfigRule] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<TrafficConfigRule>> for TrafficConfig {
    fn from(rules: Vec<TrafficConfigRule>) -> Self {
        Self(rules)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficConfigRule {
    pub riser_revision: i64,
    pub revision_name: String,
    pub percent: i32,
}

// ==================================== STATUS ===================================== //

/// Cluster-observed status, replaced wholesale on every report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentStatus {
    pub observed_riser_revision: i64,
    pub last_updated: DateTime<Utc>,
    pub latest_ready_revision_name: String,
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
    pub available_replicas: i32,
    pub docker_image: String,
    pub riser_revision: i64,
    pub rollout_status: String,
    pub rollout_status_reason: String,

    #[serde(default)]
    pub problems: Vec<StatusProblem>,
}

/// Occurrence counter for one distinct problem message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusProblem {
    pub count: i32,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentTrafficStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<i64>,

    pub revision_name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tag: String,
}
