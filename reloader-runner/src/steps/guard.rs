use async_trait::async_trait;
use reloader_core::domain::image::ImageReference;
use reloader_core::{Context, Step, StepError};

/// Skips the rollout when the exact image digest is already present locally
///
/// Tag references cannot be compared against local digests and never skip.
pub struct CompareImage {
    image: ImageReference,
}

impl CompareImage {
    pub fn new(image: ImageReference) -> Self {
        Self { image }
    }
}

#[async_trait]
impl Step for CompareImage {
    fn name(&self) -> &str {
        "CompareImage"
    }

    async fn execute(&self, ctx: &mut Context) -> Result<(), StepError> {
        if self.image.digest().is_none() {
            ctx.log().info(format!(
                "{} is not a digest reference, it is always deployed",
                self.image
            ));
            return Ok(());
        }

        let images = ctx.runtime().list_images(self.image.name()).await?;

        if images.iter().any(|image| image.matches(&self.image)) {
            ctx.log().info(format!(
                "Image {} is already present in the local repository, skipping the pipeline",
                self.image
            ));
            ctx.skip_remaining();
        }

        Ok(())
    }
}
