//! HTTP handler tests

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use riserd::app::options::{AppOptions, DeploymentSeed};
use riserd::app::run::init_stores;
use riserd::core::{NamespacedName, Stage};
use riserd::errors::ServerError;
use riserd::server::serve::router;
use riserd::server::state::ServerState;
use riserd::state::DryRunCommitter;
use riserd::storage::memory::{InMemoryDeploymentRepository, InMemoryStageRepository};
use riserd::storage::{DeploymentRepository, StageRepository};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::helpers::deployment;

struct Fixture {
    app: Router,
    deployments: Arc<InMemoryDeploymentRepository>,
    committer: Arc<DryRunCommitter>,
}

async fn fixture() -> Fixture {
    let deployments = Arc::new(InMemoryDeploymentRepository::new());
    deployments
        .save(&deployment("myapp-dep", "apps", "dev"))
        .await
        .unwrap();

    let stages = Arc::new(InMemoryStageRepository::new());
    stages.save(&Stage::new("dev")).await.unwrap();
    stages.save(&Stage::new("prod")).await.unwrap();

    let committer = Arc::new(DryRunCommitter::new());
    let state = ServerState::new(deployments.clone(), stages, committer.clone());

    Fixture {
        app: router(Arc::new(state)),
        deployments,
        committer,
    }
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let payload = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, payload)
}

#[tokio::test]
async fn test_health() {
    let fixture = fixture().await;

    let (status, body) = send(&fixture.app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "riserd");
}

#[tokio::test]
async fn test_put_rollout() {
    let fixture = fixture().await;

    let (status, body) = send(
        &fixture.app,
        Method::PUT,
        "/api/v1/rollout/dev/apps/myapp-dep",
        Some(json!({"traffic": [
            {"riserRevision": 1, "percent": 90},
            {"riserRevision": 2, "percent": 10},
        ]})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Rollout updated"}));

    let commits = fixture.committer.commits();
    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].files.len(), 1);

    let stored = fixture
        .deployments
        .get(&NamespacedName::new("myapp-dep", "apps"), "dev")
        .await
        .unwrap();
    assert_eq!(stored.doc.traffic.rules()[1].revision_name, "myapp-dep-2");
}

#[tokio::test]
async fn test_put_rollout_reports_all_violations() {
    let fixture = fixture().await;

    let (status, body) = send(
        &fixture.app,
        Method::PUT,
        "/api/v1/rollout/dev/apps/myapp-dep",
        Some(json!({"traffic": [
            {"riserRevision": 1, "percent": 50},
            {"riserRevision": 1, "percent": 40},
        ]})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["validationErrors"],
        json!([
            {
                "field": "traffic[1].riserRevision",
                "message": "revision \"1\" specified twice. You may only specify one rule per revision"
            },
            {"field": "traffic", "message": "rule percentages must add up to 100"},
        ])
    );
    assert!(fixture.committer.commits().is_empty());
}

#[tokio::test]
async fn test_put_rollout_unknown_stage() {
    let fixture = fixture().await;

    let (status, body) = send(
        &fixture.app,
        Method::PUT,
        "/api/v1/rollout/qa/apps/myapp-dep",
        Some(json!({"traffic": []})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["validationErrors"],
        json!([{"field": "stage", "message": "Invalid stage \"qa\". Must be one of: dev, prod"}])
    );
}

#[tokio::test]
async fn test_put_rollout_unknown_deployment() {
    let fixture = fixture().await;

    let (status, _) = send(
        &fixture.app,
        Method::PUT,
        "/api/v1/rollout/dev/apps/missing",
        Some(json!({"traffic": [{"riserRevision": 1, "percent": 100}]})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(fixture.committer.commits().is_empty());
}

#[tokio::test]
async fn test_status_round_trip() {
    let fixture = fixture().await;
    let uri = "/api/v1/deployments/dev/apps/myapp-dep/status";

    let (status, body) = send(&fixture.app, Method::GET, uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deploymentName"], "myapp-dep");
    assert_eq!(body["stageName"], "dev");
    assert_eq!(body["riserRevision"], 0);
    assert!(body.get("lastUpdated").is_none());

    let report = json!({
        "observedRiserRevision": 2,
        "latestReadyRevisionName": "myapp-dep-1",
        "latestCreatedRevisionName": "myapp-dep-2",
        "revisions": [{
            "name": "myapp-dep-1",
            "availableReplicas": 2,
            "dockerImage": "registry/myapp:1.0",
            "riserRevision": 1,
            "rolloutStatus": "Complete",
            "rolloutStatusReason": "",
            "problems": [{"count": 3, "message": "OOMKilled"}]
        }],
        "traffic": [{"percent": 100, "revisionName": "myapp-dep-1", "tag": "r1"}]
    });
    let (status, _) = send(&fixture.app, Method::PUT, uri, Some(report)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&fixture.app, Method::GET, uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["riserRevision"], 2);
    assert_eq!(body["observedRiserRevision"], 2);
    assert_eq!(body["revisions"][0]["problems"][0]["message"], "OOMKilled");
    assert_eq!(body["traffic"][0]["tag"], "r1");
    assert!(body["lastUpdated"].is_string());
}

#[tokio::test]
async fn test_put_status_unknown_deployment() {
    let fixture = fixture().await;

    let (status, _) = send(
        &fixture.app,
        Method::PUT,
        "/api/v1/deployments/dev/apps/missing/status",
        Some(json!({"observedRiserRevision": 1})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rollout_to_deployment_registered_at_startup() {
    let options = AppOptions {
        stages: vec!["dev".to_string()],
        deployments: vec!["dev/apps/web=webapp".parse::<DeploymentSeed>().unwrap()],
        ..Default::default()
    };
    let (deployments, stages) = init_stores(&options).await.unwrap();
    let committer = Arc::new(DryRunCommitter::new());
    let app = router(Arc::new(ServerState::new(
        deployments.clone(),
        stages,
        committer.clone(),
    )));

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/v1/rollout/dev/apps/web",
        Some(json!({"traffic": [{"riserRevision": 1, "percent": 100}]})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Rollout updated"}));
    assert_eq!(committer.commits().len(), 1);

    let stored = deployments
        .get(&NamespacedName::new("web", "apps"), "dev")
        .await
        .unwrap();
    assert_eq!(stored.app_name, "webapp");
    assert_eq!(stored.doc.traffic.rules()[0].revision_name, "web-1");
}

#[tokio::test]
async fn test_startup_rejects_deployment_in_unknown_stage() {
    let options = AppOptions {
        stages: vec!["dev".to_string()],
        deployments: vec!["prod/apps/web".parse::<DeploymentSeed>().unwrap()],
        ..Default::default()
    };

    let result = init_stores(&options).await;

    assert!(matches!(result, Err(ServerError::ConfigError(_))));
}
