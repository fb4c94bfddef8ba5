//! DTOs for the HTTP trigger
//!
//! Shared between the server (which receives them) and the client (which
//! sends them).

use serde::{Deserialize, Serialize};

use crate::domain::run::RunOutcome;

/// Request to roll out a new image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReloadRequest {
    pub image: String,
}

/// Response to a successful (or skipped) rollout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReloadResponse {
    pub status: RunOutcome,
    pub correlation_id: String,
}

/// Error body returned for every non-2xx response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Header carrying the correlation id of the run that served a request
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";
