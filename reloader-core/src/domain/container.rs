//! Container domain types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::image::ImageReference;

/// A container known to the runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerHandle {
    pub id: String,
    pub name: String,
}

impl fmt::Display for ContainerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, short_id(&self.id))
    }
}

fn short_id(id: &str) -> &str {
    let id = id.strip_prefix("sha256:").unwrap_or(id);
    &id[..id.len().min(12)]
}

/// Restart policy for a created container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestartPolicy {
    /// `no`, `always`, `unless-stopped` or `on-failure`
    pub name: String,

    /// Only meaningful for `on-failure`
    #[serde(default)]
    pub maximum_retry_count: Option<u32>,
}

impl Default for RestartPolicy {
    fn default() -> Self {
        Self {
            name: "unless-stopped".to_string(),
            maximum_retry_count: None,
        }
    }
}

impl fmt::Display for RestartPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.maximum_retry_count {
            Some(count) if self.name == "on-failure" => write!(f, "{}:{}", self.name, count),
            _ => f.write_str(&self.name),
        }
    }
}

/// Everything needed to create the replacement container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    pub image: ImageReference,
    pub name: String,
    pub environment: BTreeMap<String, String>,
    pub labels: BTreeMap<String, String>,
    pub restart_policy: RestartPolicy,
    pub network: Option<String>,
    pub memory_limit: Option<String>,
}

/// Result of running a command inside a container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutput {
    pub exit_code: i32,
    pub output: String,
}

impl ExecOutput {
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}
