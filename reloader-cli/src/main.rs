//! Reloader CLI
//!
//! Command-line interface for triggering rollouts on a Reloader server.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;

#[derive(Parser)]
#[command(name = "reloader")]
#[command(about = "Trigger container rollouts on a Reloader server", long_about = None)]
struct Cli {
    /// Server URL
    #[arg(long, env = "RELOADER_URL", default_value = "http://localhost:8181")]
    url: String,

    /// Header carrying the token
    #[arg(long, env = "RELOADER_AUTH_HEADER", default_value = "Authorization")]
    header: String,

    /// Shared secret configured on the server
    #[arg(long, env = "RELOADER_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config {
        url: cli.url,
        header: cli.header,
        token: cli.token,
    };

    handle_command(cli.command, &config).await
}
