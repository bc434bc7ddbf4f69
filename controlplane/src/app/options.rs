//! Application configuration options

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Main application options
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    pub server: ServerOptions,
    pub lifecycle: LifecycleOptions,

    /// Stages registered in the side-store on startup
    pub stages: Vec<String>,

    /// Deployments registered in the side-store on startup
    pub deployments: Vec<DeploymentSeed>,
}

/// A deployment known to the control plane before any rollout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentSeed {
    pub stage: String,
    pub namespace: String,
    pub name: String,

    /// Defaults to the deployment name
    #[serde(default)]
    pub app: Option<String>,
}

impl DeploymentSeed {
    pub fn app_name(&self) -> &str {
        self.app.as_deref().unwrap_or(&self.name)
    }
}

/// Parses `stage/namespace/name` with an optional `=app` suffix
impl FromStr for DeploymentSeed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (path, app) = match s.split_once('=') {
            Some((path, app)) => (path, Some(app.trim().to_string())),
            None => (s, None),
        };
        let parts: Vec<&str> = path.split('/').map(str::trim).collect();
        match parts.as_slice() {
            [stage, namespace, name]
                if !stage.is_empty() && !namespace.is_empty() && !name.is_empty() =>
            {
                Ok(Self {
                    stage: stage.to_string(),
                    namespace: namespace.to_string(),
                    name: name.to_string(),
                    app: app.filter(|a| !a.is_empty()),
                })
            }
            _ => Err(format!(
                "Invalid deployment \"{}\", expected stage/namespace/name[=app]",
                s
            )),
        }
    }
}

/// Lifecycle options for the control plane
#[derive(Debug, Clone)]
pub struct LifecycleOptions {
    /// Maximum delay for graceful shutdown
    pub max_shutdown_delay: Duration,
}

impl Default for LifecycleOptions {
    fn default() -> Self {
        Self {
            max_shutdown_delay: Duration::from_secs(30),
        }
    }
}

/// HTTP server options
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Address to bind to, `host:port`
    pub bind_address: String,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
        }
    }
}
