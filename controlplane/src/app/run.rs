//! Main application run loop

use std::future::Future;
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{error, info};

use crate::app::options::AppOptions;
use crate::core::{Deployment, DeploymentDoc, Stage};
use crate::errors::ServerError;
use crate::git::{RepoSettings, StateRepo};
use crate::server::serve::serve;
use crate::server::state::ServerState;
use crate::state::GitCommitter;
use crate::storage::memory::{InMemoryDeploymentRepository, InMemoryStageRepository};
use crate::storage::{DeploymentRepository, StageRepository};

/// Run the control plane until `shutdown_signal` resolves or the server exits
pub async fn run(
    repo_settings: RepoSettings,
    options: AppOptions,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ServerError> {
    info!("Initializing riser control plane...");

    info!(
        "Opening state repository {} (branch {}) at {}",
        repo_settings.url(),
        repo_settings.branch(),
        repo_settings.local_git_dir().display()
    );
    let repo = Arc::new(StateRepo::open(repo_settings).await?);

    let (deployments, stages) = init_stores(&options).await?;

    let state = Arc::new(ServerState::new(
        deployments,
        stages,
        Arc::new(GitCommitter::new(repo)),
    ));

    let (shutdown_tx, mut shutdown_rx) = broadcast::channel::<()>(1);
    let mut server_handle = serve(&options.server, state, async move {
        let _ = shutdown_rx.recv().await;
    })
    .await?;

    tokio::select! {
        _ = shutdown_signal => {
            info!("Shutdown signal received, shutting down...");
        }
        result = &mut server_handle => {
            error!("HTTP server exited unexpectedly");
            return result.map_err(|e| ServerError::ServerError(e.to_string()))?;
        }
    }

    let _ = shutdown_tx.send(());
    match tokio::time::timeout(options.lifecycle.max_shutdown_delay, server_handle).await {
        Ok(result) => result.map_err(|e| ServerError::ServerError(e.to_string()))??,
        Err(_) => {
            return Err(ServerError::ServerError(format!(
                "Shutdown timed out after {:?}",
                options.lifecycle.max_shutdown_delay
            )));
        }
    }

    info!("Shutdown complete");
    Ok(())
}

/// Build the side-store and register the configured stages and deployments
pub async fn init_stores(
    options: &AppOptions,
) -> Result<(Arc<InMemoryDeploymentRepository>, Arc<InMemoryStageRepository>), ServerError> {
    let stages = Arc::new(InMemoryStageRepository::new());
    for name in &options.stages {
        stages.save(&Stage::new(name)).await?;
        info!("Registered stage {}", name);
    }

    let deployments = Arc::new(InMemoryDeploymentRepository::new());
    for seed in &options.deployments {
        if !options.stages.contains(&seed.stage) {
            return Err(ServerError::ConfigError(format!(
                "Deployment {}.{} names unknown stage \"{}\"",
                seed.name, seed.namespace, seed.stage
            )));
        }
        deployments
            .save(&Deployment {
                name: seed.name.clone(),
                namespace: seed.namespace.clone(),
                stage_name: seed.stage.clone(),
                app_name: seed.app_name().to_string(),
                riser_revision: 0,
                doc: DeploymentDoc::default(),
            })
            .await?;
        info!(
            "Registered deployment {}.{} in stage {}",
            seed.name, seed.namespace, seed.stage
        );
    }

    Ok((deployments, stages))
}
