//! API Module
//!
//! HTTP trigger for rollouts plus a health endpoint.

pub mod error;
pub mod health;
pub mod reload;

use axum::{
    Router,
    routing::{get, post},
};
use reloader_core::{ContainerRuntime, PipelineEngine};
use reloader_runner::DeploymentPlan;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::auth::Authenticator;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub engine: PipelineEngine,
    pub runtime: Arc<dyn ContainerRuntime>,
    pub plan: Arc<DeploymentPlan>,
    pub auth: Arc<Authenticator>,
    /// Only images starting with this prefix may be deployed
    pub image_prefix: Option<Arc<str>>,
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", post(reload::reload))
        .route("/health", get(health::health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
