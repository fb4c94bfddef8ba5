//! Reloader Core
//!
//! Core types and the pipeline execution engine for Reloader.
//!
//! This crate contains:
//! - Domain types: image references, container specs, run status
//! - DTOs: request/response bodies shared by the server and the client
//! - The `ContainerRuntime` capability consumed by concrete steps
//! - The engine: `Context`, `Step`, rollback and the single-worker scheduler

pub mod context;
pub mod domain;
pub mod dto;
pub mod engine;
pub mod error;
pub mod rollback;
pub mod runtime;
pub mod step;

#[cfg(test)]
pub(crate) mod test_support;

pub use context::{Context, RunLogger};
pub use engine::{PipelineEngine, RunHandle};
pub use error::{PipelineError, StepError};
pub use rollback::{RollbackController, RollbackReport};
pub use runtime::{ContainerRuntime, RuntimeError};
pub use step::Step;
