use async_trait::async_trait;
use reloader_core::{Context, Step, StepError};

/// Remembers the containers carrying the deployment label
///
/// Stopped containers are included; they are replaced all the same.
pub struct CollectContainers {
    label: String,
}

impl CollectContainers {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

#[async_trait]
impl Step for CollectContainers {
    fn name(&self) -> &str {
        "CollectContainers"
    }

    async fn execute(&self, ctx: &mut Context) -> Result<(), StepError> {
        ctx.log()
            .info(format!("Collect containers with label: {}", self.label));

        let containers = ctx.runtime().list_containers(&self.label).await?;

        let names: Vec<String> = containers.iter().map(ToString::to_string).collect();
        ctx.log().info(format!(
            "Found {} container(s): [{}]",
            containers.len(),
            names.join(", ")
        ));

        ctx.set_old_containers(containers);
        Ok(())
    }
}
