//! Reloader HTTP Client
//!
//! A small, typed client for triggering rollouts on a Reloader server, used
//! by the `reloader` CLI and by CI tooling written in Rust.
//!
//! # Example
//!
//! ```no_run
//! use reloader_client::ReloaderClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = ReloaderClient::new("http://localhost:8181")
//!         .with_token("Authorization", "s3cret");
//!
//!     let response = client.reload("ghcr.io/acme/api@sha256:abc").await?;
//!     println!("{:?} ({})", response.status, response.correlation_id);
//!     Ok(())
//! }
//! ```

pub mod error;

pub use error::{ClientError, Result};
pub use reloader_core::domain::run::RunOutcome;
pub use reloader_core::dto::ReloadResponse;

use reloader_core::dto::ReloadRequest;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

/// HTTP client for the Reloader trigger API
#[derive(Debug, Clone)]
pub struct ReloaderClient {
    /// Base URL of the server (e.g., "http://localhost:8181")
    base_url: String,
    /// HTTP client instance
    client: Client,
    /// Header name and value carrying the token
    token: Option<(String, String)>,
}

impl ReloaderClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the server (e.g., "http://localhost:8181")
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// Rollouts can take a while (pull plus readiness probing), so a
    /// configured client should allow for a generous timeout.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            token: None,
        }
    }

    /// Authenticate requests with `token` sent in `header`
    ///
    /// For the `Authorization` header the token is sent as `Bearer <token>`.
    pub fn with_token(mut self, header: impl Into<String>, token: impl Into<String>) -> Self {
        let header = header.into();
        let token = token.into();
        let value = if header.eq_ignore_ascii_case("authorization") {
            format!("Bearer {}", token)
        } else {
            token
        };
        self.token = Some((header, value));
        self
    }

    /// Get the base URL of the server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Roll out `image` and wait for the run to finish
    ///
    /// # Returns
    /// Whether the image was deployed or was already present
    pub async fn reload(&self, image: &str) -> Result<ReloadResponse> {
        let url = format!("{}/", self.base_url);
        tracing::debug!("Requesting reload of {}", image);

        let response = self
            .authorize(self.client.post(&url))
            .json(&ReloadRequest {
                image: image.to_string(),
            })
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Check that the server is up
    pub async fn health(&self) -> Result<()> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::api_error(status.as_u16(), &body));
        }

        Ok(())
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some((header, value)) => request.header(header.as_str(), value.as_str()),
            None => request,
        }
    }

    /// Handle an API response and deserialize JSON
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), &body));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}
