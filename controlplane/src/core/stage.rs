use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A deployment target (e.g. "dev", "prod") backed by one cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub name: String,
    pub doc: StageDoc,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageDoc {
    /// Last time the stage's cluster agent checked in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_ping: Option<DateTime<Utc>>,
}

impl Stage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: StageDoc::default(),
        }
    }
}
