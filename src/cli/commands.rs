//! Top-level command definitions and dispatch.

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::store::StoreSession;

use super::fetch_captions::{handle_fetch_captions, FetchCaptionsArgs};
use super::init::{handle_init, InitArgs};
use super::inspect::{handle_inspect, InspectArgs};
use super::load::{handle_load, LoadArgs};
use super::monitor::{handle_monitor, MonitorArgs};
use super::similar::{handle_similar, SimilarArgs};
use super::status::{handle_status, StatusArgs};

#[derive(Parser, Debug)]
#[command(author, version, about = "CLI for a Qdrant-backed render store", long_about = None)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    /// Override the vector store host from the config file
    #[arg(long, global = true)]
    pub host: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the render and object collections
    Init(InitArgs),

    /// Show point counts for the configured collections
    Status(StatusArgs),

    /// Compare dataset directory entries against stored point counts
    Monitor(MonitorArgs),

    /// Fetch a single point by id and print its payload
    Inspect(InspectArgs),

    /// Find the stored objects nearest to a given one
    Similar(SimilarArgs),

    /// Load a dataset directory into the store
    Load(LoadArgs),

    /// Download and verify the captions CSV
    FetchCaptions(FetchCaptionsArgs),
}

/// Dispatches a parsed command.
///
/// Commands that talk to the vector store open a [`StoreSession`] for the
/// duration of the command; `fetch-captions` works offline and does not.
pub async fn handle_command(args: CliArgs, config: &mut AppConfig) -> Result<()> {
    if let Some(host) = args.host {
        config.host = host;
    }

    match args.command {
        Commands::Init(init_args) => {
            let session = StoreSession::connect(config).await?;
            handle_init(&init_args, config, session.client()).await
        }
        Commands::Status(status_args) => {
            let session = StoreSession::connect(config).await?;
            handle_status(&status_args, config, session.client()).await
        }
        Commands::Monitor(monitor_args) => {
            let session = StoreSession::connect(config).await?;
            handle_monitor(&monitor_args, config, session.client()).await
        }
        Commands::Inspect(inspect_args) => {
            let session = StoreSession::connect(config).await?;
            handle_inspect(&inspect_args, config, session.client()).await
        }
        Commands::Similar(similar_args) => {
            let session = StoreSession::connect(config).await?;
            handle_similar(&similar_args, config, session.client()).await
        }
        Commands::Load(load_args) => {
            let session = StoreSession::connect(config).await?;
            handle_load(&load_args, config, session.client()).await
        }
        Commands::FetchCaptions(fetch_args) => handle_fetch_captions(&fetch_args, config).await,
    }
}
