//! Server configuration
//!
//! Loaded from a TOML file whose path comes from `RELOADER_CONFIG`
//! (default `reloader.toml`). `${VAR}` references in the file are replaced
//! with environment values before parsing, and a couple of settings can be
//! overridden directly from the environment.

use anyhow::Context as _;
use reloader_runner::{ContainerSettings, DeploymentPlan, HealthcheckSettings};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "reloader.toml";

/// Complete server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub logging: LoggingSettings,

    pub auth: AuthSettings,

    pub filter: FilterSettings,

    #[serde(default)]
    pub runtime: RuntimeSettings,

    pub container: ContainerSettings,

    pub healthcheck: HealthcheckSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// How many reload requests may wait behind the one being deployed
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

/// Fallback log filter, used when `RUST_LOG` is unset
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    /// Header carrying the token. `Authorization` expects `Bearer <token>`
    #[serde(default = "default_auth_header")]
    pub header: String,

    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilterSettings {
    /// Label selecting the containers replaced by a rollout, e.g. `app=api`
    pub label: String,

    /// Only images starting with this prefix may be deployed
    #[serde(default)]
    pub image_prefix: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeSettings {
    /// `docker` or `podman`
    #[serde(default = "default_runtime_binary")]
    pub binary: String,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            binary: default_runtime_binary(),
        }
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0:8181".to_string()
}

fn default_queue_capacity() -> usize {
    16
}

fn default_log_level() -> String {
    "reloader_server=info,reloader_runner=info,reloader_core=info,tower_http=debug".to_string()
}

fn default_auth_header() -> String {
    "Authorization".to_string()
}

fn default_runtime_binary() -> String {
    "docker".to_string()
}

impl Config {
    /// Loads, overrides and validates the configuration
    ///
    /// Environment variables:
    /// - RELOADER_CONFIG (optional, default: reloader.toml)
    /// - RELOADER_BIND_ADDR (optional, overrides `server.bind_addr`)
    /// - RELOADER_API_KEY (optional, overrides `auth.api_key`)
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("RELOADER_CONFIG")
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let path = shellexpand::tilde(&path).into_owned();

        let mut config = Self::from_file(&path)?;

        if let Ok(bind_addr) = std::env::var("RELOADER_BIND_ADDR") {
            config.server.bind_addr = bind_addr;
        }
        if let Ok(api_key) = std::env::var("RELOADER_API_KEY") {
            config.auth.api_key = api_key;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a configuration file without validating it
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path))?;

        Self::from_toml(&text).with_context(|| format!("Invalid config file {}", path))
    }

    /// Parses configuration text after substituting environment variables
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        let expanded = shellexpand::env(text)
            .map_err(|e| anyhow::anyhow!("Failed to expand environment variables: {}", e))?;

        let config = toml::from_str(&expanded)?;
        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.auth.api_key.is_empty() {
            anyhow::bail!("auth.api_key cannot be empty");
        }

        if axum::http::HeaderName::try_from(self.auth.header.as_str()).is_err() {
            anyhow::bail!("auth.header is not a valid header name: {}", self.auth.header);
        }

        if self.filter.label.is_empty() {
            anyhow::bail!("filter.label cannot be empty");
        }

        if self.container.name_prefix.is_empty() {
            anyhow::bail!("container.name_prefix cannot be empty");
        }

        if self.healthcheck.command.is_empty() {
            anyhow::bail!("healthcheck.command cannot be empty");
        }

        if self.healthcheck.interval_secs == 0 {
            anyhow::bail!("healthcheck.interval_secs must be greater than 0");
        }

        if self.healthcheck.retries == 0 {
            anyhow::bail!("healthcheck.retries must be greater than 0");
        }

        if self.server.queue_capacity == 0 {
            anyhow::bail!("server.queue_capacity must be greater than 0");
        }

        Ok(())
    }

    /// The rollout plan described by this configuration
    pub fn deployment_plan(&self) -> DeploymentPlan {
        DeploymentPlan {
            label: self.filter.label.clone(),
            container: self.container.clone(),
            healthcheck: self.healthcheck.clone(),
        }
    }
}
