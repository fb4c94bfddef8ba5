//! Error types for pipeline execution

use std::time::Duration;
use thiserror::Error;

use crate::runtime::RuntimeError;

/// Failure of a step's forward or compensating action
#[derive(Debug, Error)]
pub enum StepError {
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// The readiness probe never passed within its retry budget
    #[error("Container readiness probe failed within {}s", .waited.as_secs())]
    ReadinessTimeout { waited: Duration },

    /// A step read a value that no earlier step produced
    #[error("Pipeline state `{0}` was not produced by an earlier step")]
    MissingState(&'static str),

    #[error("{0}")]
    Other(String),
}

/// What the caller of the engine sees when a run does not succeed
///
/// The root cause is deliberately absent; it is only in the run's log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("Failed to deploy new image, see log for more information.")]
    Failed,

    #[error("Pipeline engine is not running")]
    EngineUnavailable,
}
