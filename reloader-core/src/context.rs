//! Execution context for pipeline runs
//!
//! Contains all state needed during one run:
//! - Container runtime handle used by the steps
//! - Correlation id and the logger bound to it
//! - Skip flag set by guard steps
//! - Values produced by one step and consumed by a later one

use std::fmt::Display;
use std::sync::Arc;

use crate::domain::container::ContainerHandle;
use crate::error::StepError;
use crate::runtime::ContainerRuntime;

/// Logger bound to a single run
///
/// Every event carries the run's `correlation_id` as a structured field, so
/// the log stream of one deployment can be filtered out of the process log.
#[derive(Debug, Clone)]
pub struct RunLogger {
    correlation_id: Arc<str>,
}

impl RunLogger {
    pub fn new(correlation_id: impl Into<Arc<str>>) -> Self {
        Self {
            correlation_id: correlation_id.into(),
        }
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    /// Logs a debug message
    pub fn debug(&self, message: impl Display) {
        tracing::debug!(correlation_id = %self.correlation_id, "{}", message);
    }

    /// Logs an info message
    pub fn info(&self, message: impl Display) {
        tracing::info!(correlation_id = %self.correlation_id, "{}", message);
    }

    /// Logs a warning message
    pub fn warn(&self, message: impl Display) {
        tracing::warn!(correlation_id = %self.correlation_id, "{}", message);
    }

    /// Logs an error message
    pub fn error(&self, message: impl Display) {
        tracing::error!(correlation_id = %self.correlation_id, "{}", message);
    }
}

/// Execution context owned by exactly one run
pub struct Context {
    runtime: Arc<dyn ContainerRuntime>,
    log: RunLogger,
    skip: bool,

    /// Container created by the run step, removed again on rollback
    new_container: Option<ContainerHandle>,

    /// Containers that the new one replaces
    old_containers: Option<Vec<ContainerHandle>>,
}

impl Context {
    /// Creates a new execution context
    ///
    /// # Arguments
    /// * `runtime` - The container runtime the steps operate on
    /// * `correlation_id` - Identifier attached to every log line of the run
    pub fn new(runtime: Arc<dyn ContainerRuntime>, correlation_id: impl Into<Arc<str>>) -> Self {
        Self {
            runtime,
            log: RunLogger::new(correlation_id),
            skip: false,
            new_container: None,
            old_containers: None,
        }
    }

    pub fn runtime(&self) -> &dyn ContainerRuntime {
        self.runtime.as_ref()
    }

    pub fn correlation_id(&self) -> &str {
        self.log.correlation_id()
    }

    pub fn log(&self) -> &RunLogger {
        &self.log
    }

    /// Ends the run after the current step without rolling anything back
    ///
    /// Guard steps must call this before producing any side effect.
    pub fn skip_remaining(&mut self) {
        self.skip = true;
    }

    pub fn is_skipped(&self) -> bool {
        self.skip
    }

    pub fn set_new_container(&mut self, container: ContainerHandle) {
        self.new_container = Some(container);
    }

    /// The created container, if the run step got that far
    pub fn new_container(&self) -> Option<&ContainerHandle> {
        self.new_container.as_ref()
    }

    /// Takes the created container out of the context
    pub fn take_new_container(&mut self) -> Option<ContainerHandle> {
        self.new_container.take()
    }

    /// The created container, for steps that cannot run without it
    pub fn require_new_container(&self) -> Result<&ContainerHandle, StepError> {
        self.new_container
            .as_ref()
            .ok_or(StepError::MissingState("new_container"))
    }

    pub fn set_old_containers(&mut self, containers: Vec<ContainerHandle>) {
        self.old_containers = Some(containers);
    }

    /// The collected containers, for steps that cannot run without them
    pub fn require_old_containers(&self) -> Result<&[ContainerHandle], StepError> {
        self.old_containers
            .as_deref()
            .ok_or(StepError::MissingState("old_containers"))
    }
}
