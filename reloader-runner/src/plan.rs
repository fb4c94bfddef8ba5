//! Deployment plan
//!
//! Turns the configured container settings and a requested image into the
//! ordered list of steps for one rollout.

use reloader_core::Step;
use reloader_core::domain::container::{ContainerSpec, RestartPolicy};
use reloader_core::domain::image::ImageReference;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::steps::{
    CollectContainers, CompareImage, PullImage, RemoveOldContainers, RemoveOldImages,
    RunContainer, WaitReadiness,
};

/// How the replacement container is created
#[derive(Debug, Clone, Deserialize)]
pub struct ContainerSettings {
    /// New containers are named `<name_prefix>-<short correlation id>`
    pub name_prefix: String,

    #[serde(default)]
    pub network: Option<String>,

    /// Passed verbatim to the runtime, e.g. `512m`
    #[serde(default)]
    pub memory_limit: Option<String>,

    #[serde(default)]
    pub environment: BTreeMap<String, String>,

    #[serde(default)]
    pub labels: BTreeMap<String, String>,

    #[serde(default)]
    pub restart_policy: RestartPolicy,
}

/// Readiness probe run inside the new container
#[derive(Debug, Clone, Deserialize)]
pub struct HealthcheckSettings {
    /// Command and arguments, e.g. `["curl", "-f", "http://localhost:8080/health"]`
    pub command: Vec<String>,

    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    #[serde(default = "default_retries")]
    pub retries: u32,
}

fn default_interval_secs() -> u64 {
    5
}

fn default_retries() -> u32 {
    12
}

impl HealthcheckSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Everything needed to build the steps of a rollout
#[derive(Debug, Clone)]
pub struct DeploymentPlan {
    /// Label filter selecting the containers to replace
    pub label: String,
    pub container: ContainerSettings,
    pub healthcheck: HealthcheckSettings,
}

impl DeploymentPlan {
    /// Builds the ordered steps for rolling out `image`
    ///
    /// # Arguments
    /// * `image` - The requested image
    /// * `correlation_id` - Id of the run, used to name the new container
    pub fn steps(&self, image: &ImageReference, correlation_id: &str) -> Vec<Box<dyn Step>> {
        vec![
            Box::new(CompareImage::new(image.clone())),
            Box::new(PullImage::new(image.clone())),
            Box::new(CollectContainers::new(self.label.clone())),
            Box::new(RunContainer::new(self.container_spec(image, correlation_id))),
            Box::new(WaitReadiness::new(
                self.healthcheck.command.clone(),
                self.healthcheck.interval(),
                self.healthcheck.retries,
            )),
            Box::new(RemoveOldContainers),
            Box::new(RemoveOldImages::new(image.clone())),
        ]
    }

    fn container_spec(&self, image: &ImageReference, correlation_id: &str) -> ContainerSpec {
        let suffix: String = correlation_id
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .take(8)
            .collect();

        ContainerSpec {
            image: image.clone(),
            name: format!("{}-{}", self.container.name_prefix, suffix),
            environment: self.container.environment.clone(),
            labels: self.container.labels.clone(),
            restart_policy: self.container.restart_policy.clone(),
            network: self.container.network.clone(),
            memory_limit: self.container.memory_limit.clone(),
        }
    }
}
