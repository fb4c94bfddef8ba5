//! In-memory container runtime for step tests

use async_trait::async_trait;
use reloader_core::domain::container::{ContainerHandle, ContainerSpec, ExecOutput};
use reloader_core::domain::image::{ImageReference, ImageSummary};
use reloader_core::{Context, ContainerRuntime, RuntimeError};
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct State {
    images: Vec<ImageSummary>,
    containers: Vec<ContainerHandle>,
    calls: Vec<String>,
    failing: HashSet<&'static str>,
    probe_results: VecDeque<i32>,
    next_id: usize,
}

/// Records every call and keeps just enough state to behave like a runtime
#[derive(Clone, Default)]
pub struct FakeRuntime {
    state: Arc<Mutex<State>>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(self, id: &str, repo_digests: &[&str]) -> Self {
        self.state.lock().unwrap().images.push(ImageSummary {
            id: id.to_string(),
            repo_digests: repo_digests.iter().map(|d| d.to_string()).collect(),
        });
        self
    }

    pub fn with_container(self, id: &str, name: &str) -> Self {
        self.state.lock().unwrap().containers.push(ContainerHandle {
            id: id.to_string(),
            name: name.to_string(),
        });
        self
    }

    /// Makes the named operation (e.g. `"pull"`) fail with `CommandFailed`
    pub fn failing(self, operation: &'static str) -> Self {
        self.state.lock().unwrap().failing.insert(operation);
        self
    }

    /// Queues exit codes returned by successive `exec` calls (default: 1)
    pub fn with_probe_results(self, exit_codes: &[i32]) -> Self {
        self.state
            .lock()
            .unwrap()
            .probe_results
            .extend(exit_codes.iter().copied());
        self
    }

    pub fn context(&self) -> Context {
        Context::new(Arc::new(self.clone()), "test-run")
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn calls_to(&self, operation: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.split(' ').next() == Some(operation))
            .count()
    }

    pub fn container_ids(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.containers.iter().map(|c| c.id.clone()).collect()
    }

    pub fn image_ids(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.images.iter().map(|i| i.id.clone()).collect()
    }

    /// Records the call and fails it if configured to
    fn enter(&self, operation: &'static str, subject: &str) -> Result<(), RuntimeError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("{} {}", operation, subject));
        if state.failing.contains(operation) {
            return Err(RuntimeError::CommandFailed {
                command: format!("fake {}", operation),
                exit_code: 1,
                stderr: format!("{} failed", operation),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    async fn list_images(&self, name: &str) -> Result<Vec<ImageSummary>, RuntimeError> {
        self.enter("images", name)?;
        let state = self.state.lock().unwrap();
        Ok(state
            .images
            .iter()
            .filter(|image| {
                image
                    .repo_digests
                    .iter()
                    .any(|digest| digest.split('@').next() == Some(name))
            })
            .cloned()
            .collect())
    }

    async fn pull_image(&self, image: &ImageReference) -> Result<(), RuntimeError> {
        self.enter("pull", image.as_str())?;
        let mut state = self.state.lock().unwrap();
        if !state.images.iter().any(|i| i.matches(image)) {
            state.next_id += 1;
            let id = format!("img-{}", state.next_id);
            state.images.push(ImageSummary {
                id,
                repo_digests: vec![image.to_string()],
            });
        }
        Ok(())
    }

    async fn remove_image(&self, image: &str) -> Result<(), RuntimeError> {
        self.enter("rmi", image)?;
        let mut state = self.state.lock().unwrap();
        let before = state.images.len();
        state
            .images
            .retain(|i| i.id != image && !i.repo_digests.iter().any(|d| d == image));
        if state.images.len() == before {
            return Err(RuntimeError::NotFound(image.to_string()));
        }
        Ok(())
    }

    async fn list_containers(&self, label: &str) -> Result<Vec<ContainerHandle>, RuntimeError> {
        self.enter("ps", label)?;
        Ok(self.state.lock().unwrap().containers.clone())
    }

    async fn create_container(
        &self,
        spec: &ContainerSpec,
    ) -> Result<ContainerHandle, RuntimeError> {
        self.enter("create", &spec.name)?;
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let handle = ContainerHandle {
            id: format!("ctr-{}", state.next_id),
            name: spec.name.clone(),
        };
        state.containers.push(handle.clone());
        Ok(handle)
    }

    async fn start_container(&self, container: &ContainerHandle) -> Result<(), RuntimeError> {
        self.enter("start", &container.id)
    }

    async fn remove_container(&self, container: &ContainerHandle) -> Result<(), RuntimeError> {
        self.enter("rm", &container.id)?;
        let mut state = self.state.lock().unwrap();
        let before = state.containers.len();
        state.containers.retain(|c| c.id != container.id);
        if state.containers.len() == before {
            return Err(RuntimeError::NotFound(container.id.clone()));
        }
        Ok(())
    }

    async fn exec(
        &self,
        container: &ContainerHandle,
        command: &[String],
    ) -> Result<ExecOutput, RuntimeError> {
        self.enter("exec", &format!("{} {}", container.id, command.join(" ")))?;
        let exit_code = self
            .state
            .lock()
            .unwrap()
            .probe_results
            .pop_front()
            .unwrap_or(1);
        Ok(ExecOutput {
            exit_code,
            output: String::new(),
        })
    }
}
