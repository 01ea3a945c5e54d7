use anyhow::{Context, Result};
use clap::Parser;
use std::process::exit;
use tracing_subscriber::fmt;

// Import library modules
use renderstore_lib::{
    cli::commands::handle_command,
    cli::commands::CliArgs,
    config,
};

#[tokio::main]
async fn main() -> Result<()> {
    // --- Setup Tracing ---
    fmt::init(); // Initialize tracing subscriber

    // --- Parse Args ---
    let args = CliArgs::parse();

    // --- Load Configuration ---
    let mut config = config::load_config(None).context("Failed to load configuration")?;

    tracing::debug!(
        "Using vector store endpoints {} (HTTP) and {} (gRPC)",
        config.http_url(),
        config.grpc_url()
    );

    // --- Execute Command ---
    tracing::info!("Executing command: {:?}", args.command);

    let result = handle_command(args, &mut config).await;

    // --- Handle Result ---
    if let Err(e) = result {
        tracing::error!("Command execution failed: {:?}", e);
        eprintln!("Error: {}", e);
        exit(1);
    } else {
        tracing::debug!("Command executed successfully.");
    }

    Ok(())
}
