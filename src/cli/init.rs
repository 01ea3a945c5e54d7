use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::store::ops::ensure_collection;
use crate::store::QdrantClientTrait;

/// Arguments for the `init` command.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Drop and recreate the collections when they already exist
    #[arg(long)]
    pub recreate: bool,
}

/// Creates the render and object collections, each with one named vector
/// slot of the configured dimension.
pub async fn handle_init<C>(args: &InitArgs, config: &AppConfig, client: Arc<C>) -> Result<()>
where
    C: QdrantClientTrait + Send + Sync + 'static,
{
    let vector_name = config.collections.vector_name.as_str();
    let dimension = config.collections.vector_dimension;

    for name in [
        config.collections.renders.as_str(),
        config.collections.objects.as_str(),
    ] {
        if args.recreate && client.collection_exists(name.to_string()).await? {
            info!("Dropping collection '{}' before recreating it", name);
            client
                .delete_collection(name.to_string())
                .await
                .with_context(|| format!("Failed to delete collection '{}'", name))?;
        }

        let created = ensure_collection(client.as_ref(), name, vector_name, dimension)
            .await
            .with_context(|| format!("Failed to ensure collection '{}'", name))?;
        if created {
            println!(
                "{} collection '{}' ({} dimensions under vector slot '{}')",
                "Created".green(),
                name.cyan(),
                dimension,
                vector_name
            );
        } else {
            println!("Collection '{}' already exists", name.cyan());
        }
    }
    Ok(())
}
