use async_trait::async_trait;
use reloader_core::domain::container::ContainerSpec;
use reloader_core::{Context, Step, StepError};

/// Creates and starts the replacement container
///
/// The created container is recorded in the context before it is started, so
/// that rollback can remove it. If starting fails, the step removes the
/// container itself: a failed step is never compensated.
pub struct RunContainer {
    spec: ContainerSpec,
}

impl RunContainer {
    pub fn new(spec: ContainerSpec) -> Self {
        Self { spec }
    }
}

#[async_trait]
impl Step for RunContainer {
    fn name(&self) -> &str {
        "RunContainer"
    }

    async fn execute(&self, ctx: &mut Context) -> Result<(), StepError> {
        ctx.log().info(format!(
            "Create a new container {} from {}",
            self.spec.name, self.spec.image
        ));

        let container = ctx.runtime().create_container(&self.spec).await?;
        ctx.set_new_container(container.clone());

        ctx.log()
            .info(format!("New container has been created. Starting: {}", container));

        let started = ctx.runtime().start_container(&container).await;
        if let Err(e) = started {
            ctx.log()
                .warn(format!("Failed to start {}, removing it: {}", container, e));
            ctx.take_new_container();
            match ctx.runtime().remove_container(&container).await {
                Ok(()) => {}
                Err(cleanup) if cleanup.is_not_found() => {}
                // Nothing tracks the container past this point
                Err(cleanup) => ctx.log().error(format!(
                    "Unstarted container {} (id {}) was left behind and must be removed manually: {}",
                    container.name, container.id, cleanup
                )),
            }
            return Err(e.into());
        }

        ctx.log().info("Container successfully started");
        Ok(())
    }

    async fn compensate(&self, ctx: &mut Context) -> Result<(), StepError> {
        let Some(container) = ctx.take_new_container() else {
            return Ok(());
        };

        ctx.log().info(format!("Delete container: {}", container));

        match ctx.runtime().remove_container(&container).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => {
                ctx.log()
                    .info(format!("Container {} is already gone", container));
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
