//! Field-for-field status mapping
//!
//! Revision and traffic entries keep the order the reporter sent them in.

use chrono::Utc;
use openapi_server::models as api;

use crate::core::{
    Deployment, DeploymentRevisionStatus, DeploymentStatus, DeploymentTrafficStatus,
    StatusProblem,
};

/// Map an inbound cluster report onto the domain status. `last_updated` is
/// stamped here rather than taken from the reporter.
pub fn map_status_from_report(report: &api::DeploymentStatusMutable) -> DeploymentStatus {
    DeploymentStatus {
        observed_riser_revision: report.observed_riser_revision,
        last_updated: Utc::now(),
        latest_ready_revision_name: report.latest_ready_revision_name.clone(),
        latest_created_revision_name: report.latest_created_revision_name.clone(),
        revisions: report.revisions.iter().map(revision_from_report).collect(),
        traffic: report.traffic.iter().map(traffic_from_report).collect(),
    }
}

fn revision_from_report(revision: &api::DeploymentRevisionStatus) -> DeploymentRevisionStatus {
    DeploymentRevisionStatus {
        name: revision.name.clone(),
        available_replicas: revision.available_replicas,
        docker_image: revision.docker_image.clone(),
        riser_revision: revision.riser_revision,
        rollout_status: revision.rollout_status.clone(),
        rollout_status_reason: revision.rollout_status_reason.clone(),
        problems: revision
            .problems
            .iter()
            .map(|p| StatusProblem {
                count: p.count,
                message: p.message.clone(),
            })
            .collect(),
    }
}

fn traffic_from_report(traffic: &api::DeploymentTrafficStatus) -> DeploymentTrafficStatus {
    DeploymentTrafficStatus {
        percent: traffic.percent,
        revision_name: traffic.revision_name.clone(),
        tag: traffic.tag.clone(),
    }
}

/// Map a stored deployment onto its API view. A deployment that has never
/// reported status yields only its identity fields.
pub fn map_deployment_to_status_view(deployment: &Deployment) -> api::DeploymentStatusView {
    let mut view = api::DeploymentStatusView {
        deployment_name: deployment.name.clone(),
        stage_name: deployment.stage_name.clone(),
        ..Default::default()
    };

    if let Some(status) = &deployment.doc.status {
        view.riser_revision = deployment.riser_revision;
        view.last_updated = Some(status.last_updated);
        view.status = api::DeploymentStatusMutable {
            observed_riser_revision: status.observed_riser_revision,
            latest_ready_revision_name: status.latest_ready_revision_name.clone(),
            latest_created_revision_name: status.latest_created_revision_name.clone(),
            revisions: status.revisions.iter().map(revision_to_view).collect(),
            traffic: status.traffic.iter().map(traffic_to_view).collect(),
        };
    }

    view
}

fn revision_to_view(revision: &DeploymentRevisionStatus) -> api::DeploymentRevisionStatus {
    api::DeploymentRevisionStatus {
        name: revision.name.clone(),
        available_replicas: revision.available_replicas,
        docker_image: revision.docker_image.clone(),
        riser_revision: revision.riser_revision,
        rollout_status: revision.rollout_status.clone(),
        rollout_status_reason: revision.rollout_status_reason.clone(),
        problems: revision
            .problems
            .iter()
            .map(|p| api::StatusProblem {
                count: p.count,
                message: p.message.clone(),
            })
            .collect(),
    }
}

fn traffic_to_view(traffic: &DeploymentTrafficStatus) -> api::DeploymentTrafficStatus {
    api::DeploymentTrafficStatus {
        percent: traffic.percent,
        revision_name: traffic.revision_name.clone(),
        tag: traffic.tag.clone(),
    }
}
