//! Container runtime backed by the docker (or podman) command line
//!
//! Handles the image and container lifecycle for rollouts:
//! - Checking the runtime binary is available
//! - Listing, pulling and removing images
//! - Listing, creating, starting and removing containers
//! - Executing readiness probes inside a container

use async_trait::async_trait;
use reloader_core::domain::container::{ContainerHandle, ContainerSpec, ExecOutput};
use reloader_core::domain::image::{ImageReference, ImageSummary};
use reloader_core::{ContainerRuntime, RuntimeError};
use serde::Deserialize;
use std::process::Output;
use tokio::process::Command;
use tracing::{debug, info};

/// Container runtime driving a docker-compatible CLI
#[derive(Debug, Clone)]
pub struct CliRuntime {
    binary: String,
}

/// The subset of `image inspect` output we read
#[derive(Debug, Deserialize)]
struct InspectedImage {
    #[serde(rename = "Id")]
    id: String,
    #[serde(rename = "RepoDigests", default)]
    repo_digests: Option<Vec<String>>,
}

impl CliRuntime {
    /// Creates a runtime for the given binary (e.g. `docker` or `podman`)
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Checks that the runtime binary is installed and answers
    pub async fn check_available(&self) -> Result<String, RuntimeError> {
        let version = self.run_checked(&["--version".to_string()]).await?;
        let version = version.trim().to_string();
        info!("Container runtime is available: {}", version);
        Ok(version)
    }

    /// Runs the binary and returns its raw output
    async fn output(&self, args: &[String]) -> Result<Output, RuntimeError> {
        debug!("Running: {} {}", self.binary, args.join(" "));

        let output = Command::new(&self.binary).args(args).output().await?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stdout.trim().is_empty() {
            debug!("{} stdout: {}", self.binary, stdout.trim());
        }
        if !stderr.trim().is_empty() {
            debug!("{} stderr: {}", self.binary, stderr.trim());
        }

        Ok(output)
    }

    /// Runs the binary and returns stdout, mapping a non-zero exit to an error
    async fn run_checked(&self, args: &[String]) -> Result<String, RuntimeError> {
        let output = self.output(args).await?;

        if !output.status.success() {
            return Err(self.failure(args, &output));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn failure(&self, args: &[String], output: &Output) -> RuntimeError {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let subject = args.last().cloned().unwrap_or_default();

        if is_not_found(&stderr) {
            return RuntimeError::NotFound(subject);
        }

        RuntimeError::CommandFailed {
            command: format!("{} {}", self.binary, args.first().map_or("", String::as_str)),
            exit_code: output.status.code().unwrap_or(-1),
            stderr,
        }
    }
}

fn is_not_found(stderr: &str) -> bool {
    let stderr = stderr.to_lowercase();
    stderr.contains("no such image")
        || stderr.contains("no such container")
        || stderr.contains("image not known")
        || stderr.contains("no such object")
}

fn args<const N: usize>(fixed: [&str; N]) -> Vec<String> {
    fixed.iter().map(|arg| arg.to_string()).collect()
}

/// Builds the `create` argument list for a container spec
fn create_args(spec: &ContainerSpec) -> Vec<String> {
    let mut create = args(["create", "--name"]);
    create.push(spec.name.clone());

    for (key, value) in &spec.environment {
        create.push("--env".to_string());
        create.push(format!("{}={}", key, value));
    }
    for (key, value) in &spec.labels {
        create.push("--label".to_string());
        create.push(format!("{}={}", key, value));
    }

    create.push("--restart".to_string());
    create.push(spec.restart_policy.to_string());

    if let Some(network) = &spec.network {
        create.push("--network".to_string());
        create.push(network.clone());
    }
    if let Some(memory) = &spec.memory_limit {
        create.push("--memory".to_string());
        create.push(memory.clone());
    }

    create.push(spec.image.to_string());
    create
}

/// Parses `ps --format '{{.ID}}\t{{.Names}}'` output
fn parse_container_list(stdout: &str) -> Result<Vec<ContainerHandle>, RuntimeError> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let (id, name) = line
                .split_once('\t')
                .ok_or_else(|| RuntimeError::Parse(format!("unexpected ps line: {}", line)))?;
            Ok(ContainerHandle {
                id: id.trim().to_string(),
                name: name.trim().to_string(),
            })
        })
        .collect()
}

/// Parses `image inspect` JSON output
fn parse_inspected_images(stdout: &str) -> Result<Vec<ImageSummary>, RuntimeError> {
    let images: Vec<InspectedImage> =
        serde_json::from_str(stdout).map_err(|e| RuntimeError::Parse(e.to_string()))?;

    Ok(images
        .into_iter()
        .map(|image| ImageSummary {
            id: image.id,
            repo_digests: image.repo_digests.unwrap_or_default(),
        })
        .collect())
}

#[async_trait]
impl ContainerRuntime for CliRuntime {
    async fn list_images(&self, name: &str) -> Result<Vec<ImageSummary>, RuntimeError> {
        let mut list = args(["image", "ls", "--no-trunc", "--quiet"]);
        list.push(name.to_string());
        let stdout = self.run_checked(&list).await?;

        let mut ids: Vec<String> = stdout
            .lines()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect();
        ids.sort();
        ids.dedup();

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut inspect = args(["image", "inspect"]);
        inspect.extend(ids);
        let stdout = self.run_checked(&inspect).await?;

        parse_inspected_images(&stdout)
    }

    async fn pull_image(&self, image: &ImageReference) -> Result<(), RuntimeError> {
        info!("Pulling image {}", image);
        let mut pull = args(["pull", "--quiet"]);
        pull.push(image.to_string());
        self.run_checked(&pull).await?;
        Ok(())
    }

    async fn remove_image(&self, image: &str) -> Result<(), RuntimeError> {
        let mut rmi = args(["rmi"]);
        rmi.push(image.to_string());
        self.run_checked(&rmi).await?;
        Ok(())
    }

    async fn list_containers(&self, label: &str) -> Result<Vec<ContainerHandle>, RuntimeError> {
        let mut ps = args(["ps", "--all", "--no-trunc", "--filter"]);
        ps.push(format!("label={}", label));
        ps.push("--format".to_string());
        ps.push("{{.ID}}\t{{.Names}}".to_string());

        let stdout = self.run_checked(&ps).await?;
        parse_container_list(&stdout)
    }

    async fn create_container(
        &self,
        spec: &ContainerSpec,
    ) -> Result<ContainerHandle, RuntimeError> {
        let stdout = self.run_checked(&create_args(spec)).await?;
        let id = stdout.trim().to_string();

        if id.is_empty() {
            return Err(RuntimeError::Parse(
                "create returned no container id".to_string(),
            ));
        }

        Ok(ContainerHandle {
            id,
            name: spec.name.clone(),
        })
    }

    async fn start_container(&self, container: &ContainerHandle) -> Result<(), RuntimeError> {
        let mut start = args(["start"]);
        start.push(container.id.clone());
        self.run_checked(&start).await?;
        Ok(())
    }

    async fn remove_container(&self, container: &ContainerHandle) -> Result<(), RuntimeError> {
        let mut rm = args(["rm", "--force"]);
        rm.push(container.id.clone());
        self.run_checked(&rm).await?;
        Ok(())
    }

    async fn exec(
        &self,
        container: &ContainerHandle,
        command: &[String],
    ) -> Result<ExecOutput, RuntimeError> {
        let mut exec = args(["exec"]);
        exec.push(container.id.clone());
        exec.extend(command.iter().cloned());

        // A non-zero exit is the probe's answer, not a runtime failure
        let output = self.output(&exec).await?;
        let stderr = String::from_utf8_lossy(&output.stderr);
        if is_not_found(&stderr) {
            return Err(RuntimeError::NotFound(container.id.clone()));
        }

        let mut text = String::from_utf8_lossy(&output.stdout).to_string();
        text.push_str(&stderr);

        Ok(ExecOutput {
            exit_code: output.status.code().unwrap_or(-1),
            output: text,
        })
    }
}
