use async_trait::async_trait;
use reloader_core::{Context, Step, StepError};
use std::time::Duration;

/// Polls a readiness probe inside the new container
///
/// Waits `interval` before every poll and gives up after `retries` polls.
/// Returns as soon as the probe exits with code 0.
pub struct WaitReadiness {
    command: Vec<String>,
    interval: Duration,
    retries: u32,
}

impl WaitReadiness {
    pub fn new(command: Vec<String>, interval: Duration, retries: u32) -> Self {
        Self {
            command,
            interval,
            retries,
        }
    }
}

#[async_trait]
impl Step for WaitReadiness {
    fn name(&self) -> &str {
        "WaitReadiness"
    }

    async fn execute(&self, ctx: &mut Context) -> Result<(), StepError> {
        let container = ctx.require_new_container()?.clone();
        ctx.log()
            .info(format!("Check readiness probe of {}", container));

        for attempt in 1..=self.retries {
            tokio::time::sleep(self.interval).await;

            match ctx.runtime().exec(&container, &self.command).await {
                Ok(output) if output.succeeded() => {
                    ctx.log().info(format!(
                        "Readiness probe passed on attempt {}/{}",
                        attempt, self.retries
                    ));
                    return Ok(());
                }
                Ok(output) => ctx.log().debug(format!(
                    "Readiness probe attempt {}/{} returned {}: {}",
                    attempt,
                    self.retries,
                    output.exit_code,
                    output.output.trim()
                )),
                Err(e) => ctx.log().warn(format!(
                    "Readiness probe attempt {}/{} could not run: {}",
                    attempt, self.retries, e
                )),
            }
        }

        Err(StepError::ReadinessTimeout {
            waited: self.interval * self.retries,
        })
    }
}
