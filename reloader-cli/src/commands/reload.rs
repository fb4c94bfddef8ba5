//! Reload command handler

use anyhow::{Context, Result};
use colored::*;
use reloader_client::{ClientError, ReloaderClient, RunOutcome};

/// Roll out an image and report the outcome
pub async fn reload(client: &ReloaderClient, image: &str) -> Result<()> {
    println!("{} {}", "Reloading".bold(), image.cyan());

    let response = match client.reload(image).await {
        Ok(response) => response,
        Err(ClientError::Api { status, message }) => {
            eprintln!("{} {}", "✗".red(), message.red());
            anyhow::bail!("Server rejected the reload (status {})", status);
        }
        Err(e) => return Err(e).context("Failed to reach the server"),
    };

    println!(
        "{} {}",
        colorize_outcome(response.status),
        format!("(correlation id {})", response.correlation_id).dimmed()
    );

    Ok(())
}

/// Colorize a run outcome for display
fn colorize_outcome(outcome: RunOutcome) -> ColoredString {
    match outcome {
        RunOutcome::Succeeded => "✓ Deployed".green().bold(),
        RunOutcome::Skipped => "↷ Already running this image".yellow(),
    }
}
