//! Health command handler

use anyhow::{Context, Result};
use colored::*;
use reloader_client::ReloaderClient;

pub async fn health(client: &ReloaderClient) -> Result<()> {
    client
        .health()
        .await
        .with_context(|| format!("Server at {} is not healthy", client.base_url()))?;

    println!("{} {}", "✓".green(), format!("{} is up", client.base_url()).bold());
    Ok(())
}
