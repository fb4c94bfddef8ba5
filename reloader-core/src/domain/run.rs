//! Pipeline run domain types

use serde::{Deserialize, Serialize};

/// Lifecycle of a single pipeline run
///
/// `Pending -> Running -> {Skipped | Succeeded | Failed}`. Rollback happens
/// inside `Running` before `Failed` is published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Pending,
    Running,
    Skipped,
    Succeeded,
    Failed,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Skipped | Self::Succeeded | Self::Failed)
    }
}

/// Successful result of a run as seen by the caller
///
/// A skipped run is a success: there was deliberately nothing more to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Succeeded,
    Skipped,
}

impl From<RunOutcome> for RunStatus {
    fn from(outcome: RunOutcome) -> Self {
        match outcome {
            RunOutcome::Succeeded => RunStatus::Succeeded,
            RunOutcome::Skipped => RunStatus::Skipped,
        }
    }
}
