//! Concrete pipeline steps
//!
//! In rollout order:
//! - `CompareImage`: guard, skips the run when the image is already present
//! - `PullImage`: pulls the image, removes it again on rollback
//! - `CollectContainers`: remembers the containers to replace
//! - `RunContainer`: creates and starts the new container, removes it on rollback
//! - `WaitReadiness`: polls a probe inside the new container
//! - `RemoveOldContainers`, `RemoveOldImages`: cleanup after a healthy rollout
//!
//! Cleanup steps run after the new container is healthy. Their failures are
//! logged and swallowed: rolling back at that point would tear down a
//! working deployment to protect a stale one.

mod cleanup;
mod collect;
mod guard;
mod pull;
mod readiness;
mod run;

pub use cleanup::{RemoveOldContainers, RemoveOldImages};
pub use collect::CollectContainers;
pub use guard::CompareImage;
pub use pull::PullImage;
pub use readiness::WaitReadiness;
pub use run::RunContainer;
