//! End-to-end rollouts through the git committer

use std::sync::Arc;

use openapi_server::models::{RolloutRequest, TrafficRule};
use riserd::core::NamespacedName;
use riserd::errors::ServerError;
use riserd::git::StateRepo;
use riserd::rollout::{map_traffic_rules_to_domain, RolloutEngine, RolloutOutcome};
use riserd::state::GitCommitter;
use riserd::storage::memory::InMemoryDeploymentRepository;
use riserd::storage::DeploymentRepository;

use crate::helpers::{deployment, git, TestRemote};

const ROUTE_PATH: &str =
    "stages/dev/kube-resources/riser-managed/apps/deployments/myapp-dep/route.myapp-dep.yaml";

#[tokio::test]
async fn test_rollout_commits_route_and_repeat_is_no_changes() {
    let remote = TestRemote::new().await;
    let repo = Arc::new(StateRepo::open(remote.settings("work")).await.unwrap());
    let committer = GitCommitter::new(repo);

    let deployments = Arc::new(InMemoryDeploymentRepository::new());
    deployments
        .save(&deployment("myapp-dep", "apps", "dev"))
        .await
        .unwrap();
    let engine = RolloutEngine::new(deployments.clone());

    let name = NamespacedName::new("myapp-dep", "apps");
    let rules = vec![TrafficRule::new(1, 90), TrafficRule::new(2, 10)];
    let traffic = map_traffic_rules_to_domain(&name.name, &rules);
    assert_eq!(traffic.rules()[0].revision_name, "myapp-dep-1");
    assert_eq!(traffic.rules()[1].revision_name, "myapp-dep-2");

    let outcome = engine
        .update_traffic(&name, "dev", traffic.clone(), "shift traffic to r2", &committer)
        .await
        .unwrap();
    assert_eq!(outcome, RolloutOutcome::Updated);

    // Committed and pushed
    let bare = remote.bare.path();
    let subject = git(bare, &["log", "-1", "--format=%s", "main"]).await;
    assert_eq!(subject.trim(), "shift traffic to r2");
    let route = git(bare, &["show", &format!("main:{}", ROUTE_PATH)]).await;
    assert!(route.contains("kind: Route"));
    assert!(route.contains("revisionName: myapp-dep-1"));
    assert!(route.contains("percent: 90"));
    assert!(route.contains("tag: r2"));

    let stored = deployments
        .get(&name, "dev")
        .await
        .unwrap();
    assert_eq!(stored.doc.traffic, traffic);

    let repeat = engine
        .update_traffic(&name, "dev", traffic, "shift traffic to r2", &committer)
        .await
        .unwrap();
    assert_eq!(repeat, RolloutOutcome::NoChanges);

    let count = git(bare, &["rev-list", "--count", "main"]).await;
    assert_eq!(count.trim(), "2");
    remote.cleanup().await;
}

#[tokio::test]
async fn test_rollout_unknown_deployment_leaves_repository_untouched() {
    let remote = TestRemote::new().await;
    let repo = Arc::new(StateRepo::open(remote.settings("work")).await.unwrap());
    let committer = GitCommitter::new(repo);
    let engine = RolloutEngine::new(Arc::new(InMemoryDeploymentRepository::new()));

    let request = RolloutRequest {
        traffic: vec![TrafficRule::new(1, 100)],
    };
    let result = engine
        .rollout(&NamespacedName::new("nope", "apps"), "dev", &request, &committer)
        .await;

    assert!(matches!(result, Err(ServerError::NotFound(_))));
    let count = git(remote.bare.path(), &["rev-list", "--count", "main"]).await;
    assert_eq!(count.trim(), "1");
    remote.cleanup().await;
}
