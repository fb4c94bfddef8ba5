//! Configuration module
//!
//! Connection settings shared by every command.

use reloader_client::ReloaderClient;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the Reloader server
    pub url: String,
    /// Header carrying the token
    pub header: String,
    /// Shared secret, if any
    pub token: Option<String>,
}

impl Config {
    /// Builds a client for the configured server
    pub fn client(&self) -> ReloaderClient {
        let client = ReloaderClient::new(&self.url);
        match &self.token {
            Some(token) => client.with_token(&self.header, token),
            None => client,
        }
    }
}
