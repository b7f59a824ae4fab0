use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use envlabels_model::{Env, LABELS_ENV_VAR, NodeId, OptIn};
use envlabels_observe::LoggerConfig;

/// Environment variable pointing at the agent's JSON config file.
pub const CONFIG_ENV: &str = "ENVLABELS_CONFIG";

/// Agent configuration; every field defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub logger: LoggerConfig,
    /// Expected fleet size, used to pre-size the label cache.
    pub cache_capacity: usize,
    /// Nodes of the demo fleet driven by this agent.
    pub nodes: Vec<NodeSpec>,
}

/// One fleet member as seen by the demo connection layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSpec {
    pub name: NodeId,
    #[serde(default)]
    pub opt_in: OptIn,
    /// Statically configured labels, space separated.
    #[serde(default)]
    pub static_labels: String,
    /// Environment exposed when the node connects.
    #[serde(default)]
    pub env: Env,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            logger: LoggerConfig::default(),
            cache_capacity: 64,
            nodes: vec![
                NodeSpec {
                    name: NodeId::new("w0").expect("static node name"),
                    opt_in: OptIn::present(),
                    static_labels: "linux".into(),
                    env: Env::single(LABELS_ENV_VAR, "gpu fast"),
                },
                NodeSpec {
                    name: NodeId::new("w1").expect("static node name"),
                    opt_in: OptIn::absent(),
                    static_labels: "linux".into(),
                    env: Env::single(LABELS_ENV_VAR, "gpu fast"),
                },
            ],
        }
    }
}

impl AgentConfig {
    /// Load from the first CLI argument, else from [`CONFIG_ENV`], else defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::args()
            .nth(1)
            .or_else(|| std::env::var(CONFIG_ENV).ok());

        match path {
            Some(path) => Self::from_file(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }
}
