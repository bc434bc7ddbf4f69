//! Kubernetes resource shapes written to the state repository
//!
//! All maps are `BTreeMap` so identical input always serializes to identical bytes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::{NamespacedName, TrafficConfig};

pub const DEPLOYMENT_LABEL: &str = "riser.dev/deployment";
pub const APP_LABEL: &str = "riser.dev/app";

/// A resource that can be rendered into the state repository
pub trait KubeResource: Send + Sync {
    fn api_version(&self) -> &str;
    fn kind(&self) -> &str;
    fn metadata(&self) -> &ObjectMeta;
    fn to_yaml(&self) -> Result<String, serde_yaml::Error>;

    fn name(&self) -> &str {
        &self.metadata().name
    }

    /// Empty for cluster-scoped resources
    fn namespace(&self) -> &str {
        &self.metadata().namespace
    }
}

macro_rules! impl_kube_resource {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl KubeResource for $ty {
                fn api_version(&self) -> &str {
                    &self.api_version
                }

                fn kind(&self) -> &str {
                    &self.kind
                }

                fn metadata(&self) -> &ObjectMeta {
                    &self.metadata
                }

                fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
                    serde_yaml::to_string(self)
                }
            }
        )+
    };
}

impl_kube_resource!(Namespace, SealedSecret, Route, Manifest);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

impl ObjectMeta {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            ..Default::default()
        }
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }
}

// =================================== NAMESPACE =================================== //

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Namespace {
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
}

impl Namespace {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            api_version: "v1".to_string(),
            kind: "Namespace".to_string(),
            metadata: ObjectMeta::new(name, ""),
        }
    }
}

// ================================= SEALED SECRET ================================= //

/// A secret whose values were encrypted for the cluster before reaching us
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealedSecret {
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: SealedSecretSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealedSecretSpec {
    pub encrypted_data: BTreeMap<String, String>,
}

impl SealedSecret {
    pub fn new(
        metadata: ObjectMeta,
        encrypted_data: BTreeMap<String, String>,
    ) -> Self {
        Self {
            api_version: "bitnami.com/v1alpha1".to_string(),
            kind: "SealedSecret".to_string(),
            metadata,
            spec: SealedSecretSpec { encrypted_data },
        }
    }
}

// ===================================== ROUTE ===================================== //

/// Routes a deployment's traffic across its revisions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: RouteSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSpec {
    pub traffic: Vec<RouteTrafficTarget>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteTrafficTarget {
    pub revision_name: String,
    pub percent: i32,
    pub tag: String,
}

impl Route {
    pub fn new(deployment: &NamespacedName, app_name: &str, traffic: &TrafficConfig) -> Self {
        let metadata = ObjectMeta::new(&deployment.name, &deployment.namespace)
            .with_label(DEPLOYMENT_LABEL, &deployment.name)
            .with_label(APP_LABEL, app_name);

        let traffic = traffic
            .rules()
            .iter()
            .map(|rule| RouteTrafficTarget {
                revision_name: rule.revision_name.clone(),
                percent: rule.percent,
                tag: format!("r{}", rule.riser_revision),
            })
            .collect();

        Self {
            api_version: "serving.knative.dev/v1".to_string(),
            kind: "Route".to_string(),
            metadata,
            spec: RouteSpec { traffic },
        }
    }
}

// =================================== MANIFEST ==================================== //

/// Any other resource, with its body kept as structured data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,

    #[serde(flatten)]
    pub body: BTreeMap<String, serde_json::Value>,
}

impl Manifest {
    pub fn new(
        api_version: impl Into<String>,
        kind: impl Into<String>,
        metadata: ObjectMeta,
    ) -> Self {
        Self {
            api_version: api_version.into(),
            kind: kind.into(),
            metadata,
            body: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.body.insert(key.into(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TrafficConfigRule;

    #[test]
    fn test_route_from_traffic() {
        let traffic = TrafficConfig::from(vec![
            TrafficConfigRule {
                riser_revision: 1,
                revision_name: "myapp-1".to_string(),
                percent: 90,
            },
            TrafficConfigRule {
                riser_revision: 2,
                revision_name: "myapp-2".to_string(),
                percent: 10,
            },
        ]);

        let route = Route::new(&NamespacedName::new("myapp", "apps"), "myapp", &traffic);

        assert_eq!(route.name(), "myapp");
        assert_eq!(route.namespace(), "apps");
        assert_eq!(route.spec.traffic.len(), 2);
        assert_eq!(route.spec.traffic[0].tag, "r1");
        assert_eq!(route.spec.traffic[1].revision_name, "myapp-2");
        assert_eq!(route.spec.traffic[1].percent, 10);
    }

    #[test]
    fn test_namespace_is_cluster_scoped() {
        let ns = Namespace::new("apps");
        assert_eq!(ns.namespace(), "");
        let yaml = ns.to_yaml().unwrap();
        assert_eq!(yaml, "apiVersion: v1\nkind: Namespace\nmetadata:\n  name: apps\n");
    }
}
