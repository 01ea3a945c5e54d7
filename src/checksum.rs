//! SHA-256 verification for downloaded dataset files.
//!
//! Hosted datasets publish large files through Git LFS: the download URL
//! serves the real content while the matching `/raw/` URL serves a small
//! pointer file carrying the content's SHA-256 digest. Comparing the two
//! catches truncated or stale downloads.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::time::Duration;

use sha2::{Digest, Sha256};

use crate::constants::POINTER_FETCH_TIMEOUT_SECS;
use crate::error::Result;

const READ_CHUNK_SIZE: usize = 8192;

/// Computes the SHA-256 digest of a file, returned as lowercase hex.
pub fn sha256_file(path: &Path) -> Result<String> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buf = [0u8; READ_CHUNK_SIZE];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Extracts the SHA-256 digest from Git LFS pointer text.
///
/// Pointer files contain a line of the form `oid sha256:<hex>`.
pub fn parse_lfs_pointer(text: &str) -> Option<String> {
    text.lines().find_map(|line| {
        line.trim()
            .strip_prefix("oid sha256:")
            .map(|hex| hex.trim().to_string())
    })
}

/// Derives the LFS pointer URL from a download URL.
///
/// Replaces the first `/resolve/` path segment with `/raw/` and strips a
/// trailing `?download=true` query.
pub fn pointer_url(url: &str) -> String {
    let url = url.strip_suffix("?download=true").unwrap_or(url);
    url.replacen("/resolve/", "/raw/", 1)
}

/// Fetches the expected digest for a download URL from its LFS pointer.
///
/// Returns `None` when the pointer cannot be fetched or parsed; callers
/// treat that as "verification unavailable" rather than a failure.
pub async fn fetch_expected_checksum(
    client: &reqwest::Client,
    download_url: &str,
) -> Result<Option<String>> {
    let url = pointer_url(download_url);
    debug!("Fetching LFS pointer from {}", url);

    let response = match client
        .get(&url)
        .timeout(Duration::from_secs(POINTER_FETCH_TIMEOUT_SECS))
        .send()
        .await
    {
        Ok(resp) => resp,
        Err(e) => {
            warn!("Could not fetch LFS pointer from {}: {}", url, e);
            return Ok(None);
        }
    };

    if !response.status().is_success() {
        warn!(
            "LFS pointer request to {} returned status {}",
            url,
            response.status()
        );
        return Ok(None);
    }

    let text = response.text().await?;
    match parse_lfs_pointer(&text) {
        Some(digest) => Ok(Some(digest)),
        None => {
            warn!("Response from {} is not an LFS pointer", url);
            Ok(None)
        }
    }
}
