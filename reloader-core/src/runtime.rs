//! Container runtime capability
//!
//! The only interface concrete steps use to touch the outside world. The
//! engine itself never calls it; it only carries a handle in the `Context`.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::container::{ContainerHandle, ContainerSpec, ExecOutput};
use crate::domain::image::{ImageReference, ImageSummary};

/// Errors reported by a container runtime
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The image or container does not exist
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The runtime rejected the operation
    #[error("`{command}` failed (exit code {exit_code}): {stderr}")]
    CommandFailed {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    /// The runtime could not be invoked at all
    #[error("Failed to invoke container runtime: {0}")]
    Io(#[from] std::io::Error),

    /// The runtime answered with something we could not read
    #[error("Failed to parse runtime output: {0}")]
    Parse(String),
}

impl RuntimeError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Image and container lifecycle primitives
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Lists local images whose name matches `name`
    async fn list_images(&self, name: &str) -> Result<Vec<ImageSummary>, RuntimeError>;

    /// Pulls an image by reference
    async fn pull_image(&self, image: &ImageReference) -> Result<(), RuntimeError>;

    /// Removes an image by reference or id
    async fn remove_image(&self, image: &str) -> Result<(), RuntimeError>;

    /// Lists all containers (running or not) carrying the given label filter
    async fn list_containers(&self, label: &str) -> Result<Vec<ContainerHandle>, RuntimeError>;

    /// Creates, but does not start, a container
    async fn create_container(&self, spec: &ContainerSpec)
    -> Result<ContainerHandle, RuntimeError>;

    /// Starts a created container
    async fn start_container(&self, container: &ContainerHandle) -> Result<(), RuntimeError>;

    /// Force-removes a container, stopping it if needed
    async fn remove_container(&self, container: &ContainerHandle) -> Result<(), RuntimeError>;

    /// Runs a command inside a running container
    async fn exec(
        &self,
        container: &ContainerHandle,
        command: &[String],
    ) -> Result<ExecOutput, RuntimeError>;
}
