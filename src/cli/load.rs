use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;

use crate::captions::CaptionIndex;
use crate::config::{get_captions_path, AppConfig};
use crate::loader::load_dataset;
use crate::store::QdrantClientTrait;

/// Arguments for the `load` command.
#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Dataset directory to load
    pub dataset_dir: PathBuf,

    /// Captions CSV to attach (defaults to the fetched captions file)
    #[arg(long)]
    pub captions_file: Option<PathBuf>,

    /// Remove the per-render points once the object points are written
    #[arg(long)]
    pub delete_renders: bool,

    /// Points per upsert batch (defaults to the configured batch size)
    #[arg(long)]
    pub batch_size: Option<usize>,
}

/// Loads a dataset directory into the render and object collections.
pub async fn handle_load<C>(args: &LoadArgs, config: &AppConfig, client: Arc<C>) -> Result<()>
where
    C: QdrantClientTrait + Send + Sync + 'static,
{
    let captions = load_caption_index(args, config)?;
    let batch_size = args.batch_size.unwrap_or(config.performance.batch_size);

    let summary = load_dataset(
        client.as_ref(),
        config,
        &args.dataset_dir,
        &captions,
        args.delete_renders,
        batch_size,
    )
    .await?;

    println!(
        "{} {} object points and {} render points",
        "Loaded".green(),
        summary.objects.to_string().yellow(),
        summary.renders.to_string().yellow()
    );
    if summary.deleted_renders > 0 {
        println!(
            "Deleted {} render points",
            summary.deleted_renders.to_string().yellow()
        );
    }
    if summary.skipped_objects > 0 {
        println!(
            "{} {} objects without usable renders",
            "Skipped".yellow(),
            summary.skipped_objects
        );
    }
    if summary.missing_captions > 0 {
        println!(
            "{} objects had no caption",
            summary.missing_captions.to_string().yellow()
        );
    }
    Ok(())
}

fn load_caption_index(args: &LoadArgs, config: &AppConfig) -> Result<CaptionIndex> {
    if let Some(path) = &args.captions_file {
        return CaptionIndex::from_csv_path(path)
            .with_context(|| format!("Failed to read captions from '{}'", path.display()));
    }

    let path = get_captions_path(config)?;
    if path.exists() {
        CaptionIndex::from_csv_path(&path)
            .with_context(|| format!("Failed to read captions from '{}'", path.display()))
    } else {
        info!(
            "No captions file at '{}'; loading without captions",
            path.display()
        );
        Ok(CaptionIndex::empty())
    }
}
