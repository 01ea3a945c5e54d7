use anyhow::{anyhow, Context, Result};
use clap::Args;
use colored::*;
use std::path::PathBuf;

use crate::captions::{ensure_captions_file, CaptionIndex};
use crate::config::{get_captions_path, AppConfig};

/// Arguments for the `fetch-captions` command.
#[derive(Args, Debug)]
pub struct FetchCaptionsArgs {
    /// Source URL (defaults to the configured captions URL)
    #[arg(long)]
    pub url: Option<String>,

    /// Destination path (defaults to the user data directory)
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Skip checksum verification against the published digest
    #[arg(long)]
    pub no_verify: bool,

    /// Download again even when the file already exists
    #[arg(long)]
    pub force: bool,
}

/// Downloads the captions CSV, verifies it against its published digest, and
/// reports how many captions it parses into.
pub async fn handle_fetch_captions(args: &FetchCaptionsArgs, config: &AppConfig) -> Result<()> {
    let url = args
        .url
        .clone()
        .or_else(|| config.captions.url.clone())
        .ok_or_else(|| anyhow!("No captions URL configured; set [captions] url or pass --url"))?;
    let dest = match &args.out {
        Some(path) => path.clone(),
        None => get_captions_path(config)?,
    };

    if args.force && dest.exists() {
        std::fs::remove_file(&dest)
            .with_context(|| format!("Failed to remove '{}'", dest.display()))?;
    }

    let client = reqwest::Client::new();
    let path = ensure_captions_file(&client, &url, &dest, !args.no_verify).await?;
    let index = CaptionIndex::from_csv_path(&path)
        .with_context(|| format!("Downloaded captions at '{}' are not readable", path.display()))?;

    println!(
        "{} captions file '{}' ({} captions)",
        "Ready".green(),
        path.display(),
        index.len().to_string().yellow()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_captions_requires_a_url() {
        let args = FetchCaptionsArgs {
            url: None,
            out: None,
            no_verify: true,
            force: false,
        };
        let config = AppConfig::default();

        let err = handle_fetch_captions(&args, &config).await.unwrap_err();
        assert!(err.to_string().contains("No captions URL configured"));
    }
}
