//! Pipeline engine
//!
//! Runs submitted pipelines one at a time on a single worker task:
//! - Submissions are queued FIFO on a bounded channel
//! - Each run threads its `Context` through the steps in order
//! - A step setting the skip flag ends the run early, as a success
//! - A failing step triggers rollback of everything executed before it
//!
//! Because exactly one run is in flight at any time, steps never need to lock
//! the container runtime they share.

use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{Instrument, error, info, info_span};

use crate::context::Context;
use crate::domain::run::{RunOutcome, RunStatus};
use crate::error::PipelineError;
use crate::rollback::RollbackController;
use crate::step::Step;

type RunResult = Result<RunOutcome, PipelineError>;

/// A queued pipeline run
struct Submission {
    context: Context,
    steps: Vec<Box<dyn Step>>,
    status: watch::Sender<RunStatus>,
    reply: oneshot::Sender<RunResult>,
}

/// Handle to a scheduled run
pub struct RunHandle {
    correlation_id: String,
    status: watch::Receiver<RunStatus>,
    outcome: oneshot::Receiver<RunResult>,
}

impl RunHandle {
    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    /// Current lifecycle state of the run
    pub fn status(&self) -> RunStatus {
        *self.status.borrow()
    }

    /// Waits for the run to finish
    ///
    /// Resolves to `EngineUnavailable` if the worker is gone before the run
    /// could report back.
    pub async fn wait(self) -> RunResult {
        self.outcome
            .await
            .unwrap_or(Err(PipelineError::EngineUnavailable))
    }
}

/// Single-worker pipeline executor
///
/// Cloning is cheap; all clones feed the same worker. The worker stops once
/// every clone has been dropped and the queue is drained.
#[derive(Clone)]
pub struct PipelineEngine {
    sender: mpsc::Sender<Submission>,
}

impl PipelineEngine {
    /// Starts the worker on the current tokio runtime
    ///
    /// # Arguments
    /// * `queue_capacity` - How many runs may wait behind the one in flight
    pub fn start(queue_capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(queue_capacity.max(1));
        tokio::spawn(drain(receiver));
        Self { sender }
    }

    /// Queues a run and returns a handle to await it
    ///
    /// Only waits for room in the queue, never for the run itself.
    pub async fn schedule(&self, context: Context, steps: Vec<Box<dyn Step>>) -> RunHandle {
        let correlation_id = context.correlation_id().to_string();
        let (status_tx, status_rx) = watch::channel(RunStatus::Pending);
        let (reply_tx, reply_rx) = oneshot::channel();

        context.log().info(format!(
            "Scheduling pipeline with {} step(s)",
            steps.len()
        ));

        let submission = Submission {
            context,
            steps,
            status: status_tx,
            reply: reply_tx,
        };

        // On a closed queue the reply sender is dropped with the submission,
        // so the handle resolves to `EngineUnavailable`.
        if self.sender.send(submission).await.is_err() {
            error!(
                correlation_id = %correlation_id,
                "Pipeline engine is not running, submission dropped"
            );
        }

        RunHandle {
            correlation_id,
            status: status_rx,
            outcome: reply_rx,
        }
    }
}

/// Worker loop: one run at a time, in submission order
async fn drain(mut receiver: mpsc::Receiver<Submission>) {
    info!("Pipeline worker started");

    while let Some(submission) = receiver.recv().await {
        let Submission {
            context,
            steps,
            status,
            reply,
        } = submission;

        status.send_replace(RunStatus::Running);

        let correlation_id = context.correlation_id().to_string();
        let span = info_span!("pipeline_run", correlation_id = %correlation_id);

        // A panic escaping the run (e.g. from a compensation) must not take the worker down
        let result = match tokio::spawn(run(context, steps).instrument(span)).await {
            Ok(result) => result,
            Err(e) => {
                error!(
                    correlation_id = %correlation_id,
                    "Pipeline task panicked: {}", e
                );
                Err(PipelineError::Failed)
            }
        };

        status.send_replace(match result {
            Ok(outcome) => outcome.into(),
            Err(_) => RunStatus::Failed,
        });
        // The caller may have stopped waiting
        let _ = reply.send(result);
    }

    info!("Pipeline worker stopped");
}

/// Executes one pipeline to completion
async fn run(mut context: Context, steps: Vec<Box<dyn Step>>) -> RunResult {
    let total = steps.len();
    let mut executed: Vec<&dyn Step> = Vec::with_capacity(total);

    for (idx, step) in steps.iter().enumerate() {
        if context.is_skipped() {
            context.log().info(format!(
                "Pipeline skipped after step {}/{}",
                idx, total
            ));
            return Ok(RunOutcome::Skipped);
        }

        context
            .log()
            .info(format!("Execute step {}/{}: {}", idx + 1, total, step.name()));

        let error = match AssertUnwindSafe(step.execute(&mut context))
            .catch_unwind()
            .await
        {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(e.to_string()),
            Err(panic) => Some(format!("step panicked: {}", panic_message(panic.as_ref()))),
        };

        if let Some(error) = error {
            context.log().error(format!(
                "Error executing pipeline on step {}/{}: {}: {}",
                idx + 1,
                total,
                step.name(),
                error
            ));
            let report = RollbackController::run(&executed, &mut context).await;
            if !report.is_clean() {
                context.log().error(format!(
                    "Manual cleanup may be needed, compensation failed for: {}",
                    report.failed.join(", ")
                ));
            }
            return Err(PipelineError::Failed);
        }

        executed.push(step.as_ref());
    }

    if context.is_skipped() {
        context.log().info("Pipeline skipped by its last step");
        return Ok(RunOutcome::Skipped);
    }

    context.log().info("Pipeline successfully finished");
    Ok(RunOutcome::Succeeded)
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
