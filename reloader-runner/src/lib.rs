//! Reloader Runner
//!
//! Everything that turns the generic engine into a container rollout:
//! - `CliRuntime`: container runtime backed by the docker/podman CLI
//! - `steps`: the concrete pipeline steps
//! - `DeploymentPlan`: builds the ordered step list for one rollout

pub mod plan;
pub mod runtime;
pub mod steps;

#[cfg(test)]
pub(crate) mod fake;

pub use plan::{ContainerSettings, DeploymentPlan, HealthcheckSettings};
pub use runtime::CliRuntime;
