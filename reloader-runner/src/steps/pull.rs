use async_trait::async_trait;
use reloader_core::domain::image::ImageReference;
use reloader_core::{Context, Step, StepError};

/// Pulls the requested image
pub struct PullImage {
    image: ImageReference,
}

impl PullImage {
    pub fn new(image: ImageReference) -> Self {
        Self { image }
    }
}

#[async_trait]
impl Step for PullImage {
    fn name(&self) -> &str {
        "PullImage"
    }

    async fn execute(&self, ctx: &mut Context) -> Result<(), StepError> {
        ctx.log().info(format!("Pull image: {}", self.image));
        ctx.runtime().pull_image(&self.image).await?;
        Ok(())
    }

    async fn compensate(&self, ctx: &mut Context) -> Result<(), StepError> {
        ctx.log().info(format!("Remove image: {}", self.image));

        match ctx.runtime().remove_image(self.image.as_str()).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => {
                ctx.log()
                    .info(format!("Image {} is already gone", self.image));
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
