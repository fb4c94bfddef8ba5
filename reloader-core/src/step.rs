//! Pipeline step contract

use async_trait::async_trait;

use crate::context::Context;
use crate::error::StepError;

/// A unit of work with a forward action and a compensating action
///
/// Steps carry only their construction-time parameters; everything a run
/// produces lives in the `Context`.
#[async_trait]
pub trait Step: Send + Sync {
    /// Human-readable name for logging
    fn name(&self) -> &str;

    /// Performs the step
    ///
    /// A step that fails must leave nothing behind: it is not compensated.
    async fn execute(&self, ctx: &mut Context) -> Result<(), StepError>;

    /// Undoes the effect of `execute`
    ///
    /// Called during rollback when a later step fails. Must be a no-op when
    /// there is nothing to undo. The default suits read-only steps.
    async fn compensate(&self, ctx: &mut Context) -> Result<(), StepError> {
        let _ = ctx;
        Ok(())
    }
}
