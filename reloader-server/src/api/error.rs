//! API Error Handling
//!
//! Maps request and pipeline failures to JSON error responses. Internal
//! detail stays in the log.

use axum::{
    Json,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use reloader_core::PipelineError;
use reloader_core::dto::{CORRELATION_ID_HEADER, ErrorResponse};

/// API error type
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized,
    Forbidden(String),
    /// The run failed and was rolled back
    PipelineFailed { correlation_id: String },
    /// The pipeline engine is no longer running
    Unavailable { correlation_id: String },
}

impl ApiError {
    /// Maps the outcome of a run to an API error
    pub fn from_pipeline(error: PipelineError, correlation_id: String) -> Self {
        match error {
            PipelineError::Failed => ApiError::PipelineFailed { correlation_id },
            PipelineError::EngineUnavailable => ApiError::Unavailable { correlation_id },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, correlation_id) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Missing or invalid token".to_string(),
                None,
            ),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, None),
            ApiError::PipelineFailed { correlation_id } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                PipelineError::Failed.to_string(),
                Some(correlation_id),
            ),
            ApiError::Unavailable { correlation_id } => {
                tracing::error!(correlation_id = %correlation_id, "Pipeline engine is unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    PipelineError::EngineUnavailable.to_string(),
                    Some(correlation_id),
                )
            }
        };

        let mut response = (status, Json(ErrorResponse { error: message })).into_response();

        if let Some(value) = correlation_id.and_then(|id| HeaderValue::from_str(&id).ok()) {
            response.headers_mut().insert(CORRELATION_ID_HEADER, value);
        }

        response
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
