//! Rollback controller
//!
//! Compensates already executed steps, newest first. Compensation is
//! best-effort: a failing compensating action is logged and the sweep goes on.

use crate::context::Context;
use crate::step::Step;

/// What happened during a rollback sweep
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RollbackReport {
    /// Steps whose compensating action succeeded, in the order they ran
    pub compensated: Vec<String>,
    /// Steps whose compensating action failed, in the order they ran
    pub failed: Vec<String>,
}

impl RollbackReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct RollbackController;

impl RollbackController {
    /// Compensates `executed` in reverse order
    ///
    /// # Arguments
    /// * `executed` - Steps whose forward action completed, in execution order
    /// * `ctx` - The context of the failed run
    pub async fn run(executed: &[&dyn Step], ctx: &mut Context) -> RollbackReport {
        let mut report = RollbackReport::default();

        for step in executed.iter().rev() {
            ctx.log().info(format!("Unexecute step: {}", step.name()));

            match step.compensate(ctx).await {
                Ok(()) => report.compensated.push(step.name().to_string()),
                Err(e) => {
                    ctx.log()
                        .error(format!("Error during rollback of {}: {}", step.name(), e));
                    report.failed.push(step.name().to_string());
                }
            }
        }

        if report.is_clean() {
            ctx.log().info(format!(
                "Rollback finished, {} step(s) compensated",
                report.compensated.len()
            ));
        } else {
            ctx.log().warn(format!(
                "Rollback finished with {} failed compensation(s): {}",
                report.failed.len(),
                report.failed.join(", ")
            ));
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Journal, Recorder, context};

    #[tokio::test]
    async fn test_compensates_in_reverse_order() {
        let journal = Journal::default();
        let first = Recorder::new("first", &journal);
        let second = Recorder::new("second", &journal);
        let third = Recorder::new("third", &journal);
        let executed: Vec<&dyn Step> = vec![&first, &second, &third];

        let mut ctx = context();
        let report = RollbackController::run(&executed, &mut ctx).await;

        assert_eq!(
            journal.entries(),
            vec!["undo:third", "undo:second", "undo:first"]
        );
        assert_eq!(report.compensated, vec!["third", "second", "first"]);
        assert!(report.is_clean());
    }

    #[tokio::test]
    async fn test_failed_compensation_does_not_stop_the_sweep() {
        let journal = Journal::default();
        let first = Recorder::new("first", &journal);
        let second = Recorder::new("second", &journal).failing_compensation();
        let third = Recorder::new("third", &journal);
        let executed: Vec<&dyn Step> = vec![&first, &second, &third];

        let mut ctx = context();
        let report = RollbackController::run(&executed, &mut ctx).await;

        assert_eq!(
            journal.entries(),
            vec!["undo:third", "undo:second", "undo:first"]
        );
        assert_eq!(report.compensated, vec!["third", "first"]);
        assert_eq!(report.failed, vec!["second"]);
        assert!(!report.is_clean());
    }

    #[tokio::test]
    async fn test_empty_stack_is_a_no_op() {
        let mut ctx = context();
        let report = RollbackController::run(&[], &mut ctx).await;
        assert_eq!(report, RollbackReport::default());
    }
}
