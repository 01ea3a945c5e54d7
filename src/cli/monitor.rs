use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::dataset::entry_count;
use crate::store::ops::count_points;
use crate::store::QdrantClientTrait;

/// Arguments for the `monitor` command.
#[derive(Args, Debug)]
pub struct MonitorArgs {
    /// Dataset directory whose objects are being uploaded
    pub dataset_dir: PathBuf,

    /// Repeat the comparison every N seconds until interrupted
    #[arg(long, value_name = "SECONDS")]
    pub watch: Option<u64>,
}

/// Prints one line comparing the dataset directory's entry count against the
/// stored point counts, optionally repeating under `--watch`.
///
/// Upload progress is measured against the objects collection: one dataset
/// entry becomes one object point once fully loaded.
pub async fn handle_monitor<C>(args: &MonitorArgs, config: &AppConfig, client: Arc<C>) -> Result<()>
where
    C: QdrantClientTrait + Send + Sync + 'static,
{
    let timeout = config.timeouts.query();
    loop {
        let entries = entry_count(&args.dataset_dir).with_context(|| {
            format!(
                "Failed to count entries under '{}'",
                args.dataset_dir.display()
            )
        })?;
        let renders = count_points(
            client.as_ref(),
            config.collections.renders.as_str(),
            timeout,
        )
        .await?;
        let objects = count_points(
            client.as_ref(),
            config.collections.objects.as_str(),
            timeout,
        )
        .await?;

        let percent = if entries == 0 {
            100.0
        } else {
            objects as f64 * 100.0 / entries as f64
        };
        let progress = format!("{:.1}%", percent);
        let progress = if objects as usize >= entries {
            progress.green()
        } else {
            progress.yellow()
        };
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        println!(
            "[{}] {} dataset entries | {} render points | {} object points | {}",
            timestamp,
            entries.to_string().cyan(),
            renders.to_string().cyan(),
            objects.to_string().cyan(),
            progress
        );

        match args.watch {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs.max(1))).await,
            None => break,
        }
    }
    Ok(())
}
