use async_trait::async_trait;
use reloader_core::domain::image::ImageReference;
use reloader_core::{Context, Step, StepError};

/// Force-removes the containers collected before the rollout
pub struct RemoveOldContainers;

#[async_trait]
impl Step for RemoveOldContainers {
    fn name(&self) -> &str {
        "RemoveOldContainers"
    }

    async fn execute(&self, ctx: &mut Context) -> Result<(), StepError> {
        let old = ctx.require_old_containers()?.to_vec();
        let mut failed = 0;

        for container in &old {
            ctx.log()
                .info(format!("Remove old container: {}", container));

            match ctx.runtime().remove_container(container).await {
                Ok(()) => {}
                Err(e) if e.is_not_found() => ctx
                    .log()
                    .info(format!("Old container {} is already gone", container)),
                Err(e) => {
                    failed += 1;
                    ctx.log().error(format!(
                        "Failed to remove old container {}: {}",
                        container, e
                    ));
                }
            }
        }

        if failed > 0 {
            ctx.log().warn(format!(
                "{} of {} old container(s) could not be removed",
                failed,
                old.len()
            ));
        }

        Ok(())
    }
}

/// Removes every image of the repository except the newly deployed one
pub struct RemoveOldImages {
    image: ImageReference,
}

impl RemoveOldImages {
    pub fn new(image: ImageReference) -> Self {
        Self { image }
    }
}

#[async_trait]
impl Step for RemoveOldImages {
    fn name(&self) -> &str {
        "RemoveOldImages"
    }

    async fn execute(&self, ctx: &mut Context) -> Result<(), StepError> {
        let images = match ctx.runtime().list_images(self.image.name()).await {
            Ok(images) => images,
            Err(e) => {
                ctx.log()
                    .error(format!("Failed to list old images of {}: {}", self.image.name(), e));
                return Ok(());
            }
        };

        for image in images.iter().filter(|image| !image.matches(&self.image)) {
            ctx.log().info(format!("Remove old image with id: {}", image.id));

            if let Err(e) = ctx.runtime().remove_image(&image.id).await {
                ctx.log()
                    .error(format!("Failed to remove old image {}: {}", image.id, e));
            }
        }

        Ok(())
    }
}
