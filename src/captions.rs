//! The caption index: a UID → caption map loaded from a two-column CSV.
//!
//! The file has no header row; each record is `uid,caption`. Some corpora
//! ship revisions of the same object, so duplicate UIDs occur — the first
//! caption seen wins, matching how the upstream dataset documents itself.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::StreamExt;
use tempfile::NamedTempFile;

use crate::checksum::{fetch_expected_checksum, sha256_file};
use crate::constants::CAPTIONS_FETCH_TIMEOUT_SECS;
use crate::error::{RenderStoreError, Result};

/// In-memory caption lookup keyed by dataset UID.
#[derive(Debug, Default, Clone)]
pub struct CaptionIndex {
    map: HashMap<String, String>,
}

impl CaptionIndex {
    /// An index with no entries. Loads proceed without captions.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses a captions CSV into an index, keeping the first caption per UID.
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .map_err(|e| {
                RenderStoreError::CaptionError(format!(
                    "failed to open captions file '{}': {}",
                    path.display(),
                    e
                ))
            })?;

        let mut map = HashMap::new();
        let mut duplicates = 0usize;
        let mut short_rows = 0usize;
        for record in reader.records() {
            let record = record?;
            let (uid, caption) = match (record.get(0), record.get(1)) {
                (Some(uid), Some(caption)) if !uid.is_empty() => (uid, caption),
                _ => {
                    short_rows += 1;
                    continue;
                }
            };
            if map.contains_key(uid) {
                duplicates += 1;
                continue;
            }
            map.insert(uid.to_string(), caption.to_string());
        }

        if duplicates > 0 {
            debug!("Skipped {} duplicate caption rows (first wins)", duplicates);
        }
        if short_rows > 0 {
            warn!("Skipped {} malformed caption rows in '{}'", short_rows, path.display());
        }
        info!("Loaded {} captions from '{}'", map.len(), path.display());
        Ok(Self { map })
    }

    /// Looks up the caption for a dataset UID.
    pub fn get(&self, uid: &str) -> Option<&str> {
        self.map.get(uid).map(String::as_str)
    }

    /// Number of captions held.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True when the index holds no captions.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Streams a download to `dest`, staging through a temp file in the same
/// directory so a failed transfer never clobbers an existing copy.
pub async fn download_to(client: &reqwest::Client, url: &str, dest: &Path) -> Result<()> {
    info!("Downloading {} -> {}", url, dest.display());

    let response = client
        .get(url)
        .timeout(Duration::from_secs(CAPTIONS_FETCH_TIMEOUT_SECS))
        .send()
        .await?
        .error_for_status()?;

    let staging_dir = dest.parent().unwrap_or_else(|| Path::new("."));
    let mut staged = NamedTempFile::new_in(staging_dir)?;

    let mut stream = response.bytes_stream();
    let mut written = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        staged.write_all(&chunk)?;
        written += chunk.len() as u64;
    }
    staged.flush()?;
    staged
        .persist(dest)
        .map_err(|e| RenderStoreError::IoError(e.error))?;

    debug!("Downloaded {} bytes to '{}'", written, dest.display());
    Ok(())
}

/// Makes sure a verified captions file exists at `dest` and returns its path.
///
/// Downloads when the file is missing. With `verify`, compares the file's
/// SHA-256 digest against the one published in the URL's LFS pointer,
/// re-downloading once on mismatch; a second mismatch is an error. When the
/// pointer cannot be fetched, verification is skipped with a warning.
pub async fn ensure_captions_file(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    verify: bool,
) -> Result<PathBuf> {
    let expected = if verify {
        fetch_expected_checksum(client, url).await?
    } else {
        None
    };

    if !dest.exists() {
        download_to(client, url, dest).await?;
    }

    if let Some(expected) = expected {
        let mut actual = sha256_file(dest)?;
        if actual != expected {
            warn!(
                "Captions file '{}' failed checksum verification, re-downloading",
                dest.display()
            );
            download_to(client, url, dest).await?;
            actual = sha256_file(dest)?;
        }
        if actual != expected {
            return Err(RenderStoreError::ChecksumMismatch {
                path: dest.to_path_buf(),
                expected,
                actual,
            });
        }
        info!("Captions file '{}' passed checksum verification", dest.display());
    }

    Ok(dest.to_path_buf())
}
