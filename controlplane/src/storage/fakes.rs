//! Test doubles with canned responses and call counters

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::core::{Deployment, DeploymentStatus, NamespacedName, Stage, TrafficConfig};
use crate::errors::ServerError;
use crate::storage::{DeploymentRepository, StageRepository};

type GetDeploymentFn =
    Box<dyn Fn(&NamespacedName, &str) -> Result<Deployment, ServerError> + Send + Sync>;
type UpdateTrafficFn =
    Box<dyn Fn(&NamespacedName, &str, &TrafficConfig) -> Result<(), ServerError> + Send + Sync>;
type UpdateStatusFn =
    Box<dyn Fn(&NamespacedName, &str, &DeploymentStatus) -> Result<(), ServerError> + Send + Sync>;

fn not_configured(method: &str) -> ServerError {
    ServerError::Internal(format!("fake {} not configured", method))
}

#[derive(Default)]
pub struct FakeDeploymentRepository {
    pub get_fn: Option<GetDeploymentFn>,
    pub update_traffic_fn: Option<UpdateTrafficFn>,
    pub update_status_fn: Option<UpdateStatusFn>,

    pub get_call_count: AtomicUsize,
    pub update_traffic_call_count: AtomicUsize,
    pub update_status_call_count: AtomicUsize,
}

impl FakeDeploymentRepository {
    pub fn get_calls(&self) -> usize {
        self.get_call_count.load(Ordering::SeqCst)
    }

    pub fn update_traffic_calls(&self) -> usize {
        self.update_traffic_call_count.load(Ordering::SeqCst)
    }

    pub fn update_status_calls(&self) -> usize {
        self.update_status_call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeploymentRepository for FakeDeploymentRepository {
    async fn get(&self, name: &NamespacedName, stage: &str) -> Result<Deployment, ServerError> {
        self.get_call_count.fetch_add(1, Ordering::SeqCst);
        match &self.get_fn {
            Some(f) => f(name, stage),
            None => Err(not_configured("get")),
        }
    }

    async fn list_by_stage(&self, _stage: &str) -> Result<Vec<Deployment>, ServerError> {
        Err(not_configured("list_by_stage"))
    }

    async fn save(&self, _deployment: &Deployment) -> Result<(), ServerError> {
        Err(not_configured("save"))
    }

    async fn update_traffic(
        &self,
        name: &NamespacedName,
        stage: &str,
        traffic: &TrafficConfig,
    ) -> Result<(), ServerError> {
        self.update_traffic_call_count.fetch_add(1, Ordering::SeqCst);
        match &self.update_traffic_fn {
            Some(f) => f(name, stage, traffic),
            None => Err(not_configured("update_traffic")),
        }
    }

    async fn update_status(
        &self,
        name: &NamespacedName,
        stage: &str,
        status: &DeploymentStatus,
    ) -> Result<(), ServerError> {
        self.update_status_call_count.fetch_add(1, Ordering::SeqCst);
        match &self.update_status_fn {
            Some(f) => f(name, stage, status),
            None => Err(not_configured("update_status")),
        }
    }
}

type GetStageFn = Box<dyn Fn(&str) -> Result<Stage, ServerError> + Send + Sync>;
type ListStagesFn = Box<dyn Fn() -> Result<Vec<Stage>, ServerError> + Send + Sync>;

#[derive(Default)]
pub struct FakeStageRepository {
    pub get_fn: Option<GetStageFn>,
    pub list_fn: Option<ListStagesFn>,

    pub get_call_count: AtomicUsize,
    pub save_call_count: AtomicUsize,
}

#[async_trait]
impl StageRepository for FakeStageRepository {
    async fn get(&self, name: &str) -> Result<Stage, ServerError> {
        self.get_call_count.fetch_add(1, Ordering::SeqCst);
        match &self.get_fn {
            Some(f) => f(name),
            None => Err(not_configured("get")),
        }
    }

    async fn list(&self) -> Result<Vec<Stage>, ServerError> {
        match &self.list_fn {
            Some(f) => f(),
            None => Err(not_configured("list")),
        }
    }

    async fn save(&self, _stage: &Stage) -> Result<(), ServerError> {
        self.save_call_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
