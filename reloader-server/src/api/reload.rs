//! Reload API Handler
//!
//! Authenticates the request, validates the image and runs the rollout
//! pipeline, answering once the run has finished.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use reloader_core::Context;
use reloader_core::domain::image::ImageReference;
use reloader_core::dto::{CORRELATION_ID_HEADER, ReloadRequest, ReloadResponse};
use uuid::Uuid;

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};

/// POST /
/// Roll out the requested image
pub async fn reload(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Response> {
    if !state.auth.verify(&headers) {
        tracing::warn!("Rejected reload request with a missing or invalid token");
        return Err(ApiError::Unauthorized);
    }

    let request: ReloadRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e)))?;

    let image = ImageReference::parse(request.image)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    if let Some(prefix) = &state.image_prefix {
        if !image.is_allowed_by(prefix) {
            tracing::warn!("Rejected image outside the allow-list: {}", image);
            return Err(ApiError::Forbidden(format!(
                "Image {} is not allowed",
                image
            )));
        }
    }

    let correlation_id = Uuid::new_v4().to_string();
    tracing::info!(correlation_id = %correlation_id, "Reload requested for image {}", image);

    let context = Context::new(state.runtime.clone(), correlation_id.as_str());
    let steps = state.plan.steps(&image, &correlation_id);

    let outcome = state
        .engine
        .schedule(context, steps)
        .await
        .wait()
        .await
        .map_err(|e| ApiError::from_pipeline(e, correlation_id.clone()))?;

    let response = ReloadResponse {
        status: outcome,
        correlation_id: correlation_id.clone(),
    };

    Ok((
        [(CORRELATION_ID_HEADER, correlation_id)],
        Json(response),
    )
        .into_response())
}
