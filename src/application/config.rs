use crate::domain::chart::{UpdatePolicy, ViewConfig};
use crate::domain::errors::GraphResult;
use serde::{Deserialize, Serialize};

pub const DEFAULT_VIEWER_TAG: &str = "perspective-viewer";

/// Settings for one graph instance; every field may be omitted in JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub view: ViewConfig,
    pub update_policy: UpdatePolicy,
    /// Tag name of the rendering surface element
    pub viewer_tag: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            view: ViewConfig::default(),
            update_policy: UpdatePolicy::default(),
            viewer_tag: DEFAULT_VIEWER_TAG.to_string(),
        }
    }
}

impl GraphConfig {
    pub fn from_json(raw: &str) -> GraphResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn with_update_policy(mut self, policy: UpdatePolicy) -> Self {
        self.update_policy = policy;
        self
    }
}
