//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod health;
mod reload;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Roll out an image and wait for the result
    Reload {
        /// Image reference, preferably by digest (repo@sha256:...)
        #[arg(long)]
        image: String,
    },
    /// Check that the server is up
    Health,
}

/// Handle a CLI command
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    let client = config.client();

    match command {
        Commands::Reload { image } => reload::reload(&client, &image).await,
        Commands::Health => health::health(&client).await,
    }
}
