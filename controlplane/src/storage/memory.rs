//! In-memory side-store adapters
//!
//! Rows keep their documents encoded, the same way a relational adapter would.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::core::{
    Deployment, DeploymentDoc, DeploymentStatus, NamespacedName, Stage, StageDoc, TrafficConfig,
};
use crate::errors::ServerError;
use crate::storage::codec::{decode_doc, encode_doc};
use crate::storage::{DeploymentRepository, StageRepository};

/// (stage, namespace, name)
type DeploymentKey = (String, String, String);

#[derive(Debug, Clone)]
struct DeploymentRow {
    app_name: String,
    riser_revision: i64,
    doc: String,
}

#[derive(Default)]
pub struct InMemoryDeploymentRepository {
    rows: RwLock<BTreeMap<DeploymentKey, DeploymentRow>>,
}

impl InMemoryDeploymentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(name: &NamespacedName, stage: &str) -> DeploymentKey {
        (stage.to_string(), name.namespace.clone(), name.name.clone())
    }

    fn to_deployment(key: &DeploymentKey, row: &DeploymentRow) -> Result<Deployment, ServerError> {
        let (stage, namespace, name) = key;
        Ok(Deployment {
            name: name.clone(),
            namespace: namespace.clone(),
            stage_name: stage.clone(),
            app_name: row.app_name.clone(),
            riser_revision: row.riser_revision,
            doc: decode_doc(&row.doc)?,
        })
    }

    fn update_doc<F>(&self, name: &NamespacedName, stage: &str, update: F) -> Result<(), ServerError>
    where
        F: FnOnce(&mut DeploymentDoc),
    {
        let mut rows = self.rows.write().unwrap_or_else(|e| e.into_inner());
        let row = rows
            .get_mut(&Self::key(name, stage))
            .ok_or_else(|| not_found(name, stage))?;

        let mut doc: DeploymentDoc = decode_doc(&row.doc)?;
        update(&mut doc);
        row.doc = encode_doc(&doc)?;
        Ok(())
    }
}

fn not_found(name: &NamespacedName, stage: &str) -> ServerError {
    ServerError::NotFound(format!(
        "deployment \"{}\" not found in stage \"{}\"",
        name, stage
    ))
}

#[async_trait]
impl DeploymentRepository for InMemoryDeploymentRepository {
    async fn get(&self, name: &NamespacedName, stage: &str) -> Result<Deployment, ServerError> {
        let rows = self.rows.read().unwrap_or_else(|e| e.into_inner());
        let key = Self::key(name, stage);
        let row = rows.get(&key).ok_or_else(|| not_found(name, stage))?;
        Self::to_deployment(&key, row)
    }

    async fn list_by_stage(&self, stage: &str) -> Result<Vec<Deployment>, ServerError> {
        let rows = self.rows.read().unwrap_or_else(|e| e.into_inner());
        rows.iter()
            .filter(|(key, _)| key.0 == stage)
            .map(|(key, row)| Self::to_deployment(key, row))
            .collect()
    }

    async fn save(&self, deployment: &Deployment) -> Result<(), ServerError> {
        let row = DeploymentRow {
            app_name: deployment.app_name.clone(),
            riser_revision: deployment.riser_revision,
            doc: encode_doc(&deployment.doc)?,
        };
        let key = (
            deployment.stage_name.clone(),
            deployment.namespace.clone(),
            deployment.name.clone(),
        );
        self.rows
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, row);
        Ok(())
    }

    async fn update_traffic(
        &self,
        name: &NamespacedName,
        stage: &str,
        traffic: &TrafficConfig,
    ) -> Result<(), ServerError> {
        self.update_doc(name, stage, |doc| doc.traffic = traffic.clone())
    }

    async fn update_status(
        &self,
        name: &NamespacedName,
        stage: &str,
        status: &DeploymentStatus,
    ) -> Result<(), ServerError> {
        self.update_doc(name, stage, |doc| doc.status = Some(status.clone()))
    }
}

#[derive(Default)]
pub struct InMemoryStageRepository {
    rows: RwLock<BTreeMap<String, String>>,
}

impl InMemoryStageRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StageRepository for InMemoryStageRepository {
    async fn get(&self, name: &str) -> Result<Stage, ServerError> {
        let rows = self.rows.read().unwrap_or_else(|e| e.into_inner());
        let raw = rows
            .get(name)
            .ok_or_else(|| ServerError::NotFound(format!("stage \"{}\" not found", name)))?;
        Ok(Stage {
            name: name.to_string(),
            doc: decode_doc::<StageDoc>(raw)?,
        })
    }

    async fn list(&self) -> Result<Vec<Stage>, ServerError> {
        let rows = self.rows.read().unwrap_or_else(|e| e.into_inner());
        rows.iter()
            .map(|(name, raw)| -> Result<Stage, ServerError> {
                Ok(Stage {
                    name: name.clone(),
                    doc: decode_doc(raw)?,
                })
            })
            .collect()
    }

    async fn save(&self, stage: &Stage) -> Result<(), ServerError> {
        let raw = encode_doc(&stage.doc)?;
        self.rows
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(stage.name.clone(), raw);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TrafficConfigRule;

    fn deployment() -> Deployment {
        Deployment {
            name: "myapp".to_string(),
            namespace: "apps".to_string(),
            stage_name: "dev".to_string(),
            app_name: "myapp".to_string(),
            riser_revision: 2,
            doc: DeploymentDoc::default(),
        }
    }

    #[tokio::test]
    async fn test_get_unknown_deployment_is_not_found() {
        let repo = InMemoryDeploymentRepository::new();
        let err = repo
            .get(&NamespacedName::new("nope", "apps"), "dev")
            .await
            .unwrap_err();

        assert!(matches!(err, ServerError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_traffic_keeps_status() {
        let repo = InMemoryDeploymentRepository::new();
        repo.save(&deployment()).await.unwrap();
        let name = NamespacedName::new("myapp", "apps");

        let traffic = TrafficConfig::from(vec![TrafficConfigRule {
            riser_revision: 2,
            revision_name: "myapp-2".to_string(),
            percent: 100,
        }]);
        repo.update_traffic(&name, "dev", &traffic).await.unwrap();

        let saved = repo.get(&name, "dev").await.unwrap();
        assert_eq!(saved.doc.traffic, traffic);
        assert!(saved.doc.status.is_none());
        assert_eq!(saved.riser_revision, 2);
        assert_eq!(repo.list_by_stage("dev").await.unwrap().len(), 1);
        assert!(repo.list_by_stage("prod").await.unwrap().is_empty());
    }
}
