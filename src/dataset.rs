//! Dataset directory layout and deterministic point ids.
//!
//! A dataset is a directory with one subdirectory per object, named by the
//! object's dataset UID. Each subdirectory holds render images (`NNNNN.png`)
//! plus a JSON sidecar per render (`NNNNN.json`) carrying the precomputed
//! embedding. Auxiliary render passes (depth, normals) are written with a
//! `_` in the file stem and are not loaded.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use uuid::Uuid;
use walkdir::WalkDir;

use crate::error::{RenderStoreError, Result};

/// One object directory: its dataset UID and the renders found inside.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSet {
    /// Dataset UID, taken from the directory name.
    pub object_uid: String,
    /// Absolute or caller-relative path of the object directory.
    pub dir: PathBuf,
    /// Render image paths, sorted by file name. May be empty.
    pub renders: Vec<PathBuf>,
}

/// True when `path` names a render image: a `.png` whose stem carries no `_`.
pub fn is_render_file(path: &Path) -> bool {
    let is_png = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("png"))
        .unwrap_or(false);
    if !is_png {
        return false;
    }
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| !s.contains('_'))
        .unwrap_or(false)
}

/// Lists the render images directly inside `dir`, sorted by file name.
pub fn list_renders(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut renders: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_render_file(path))
        .collect();
    renders.sort();
    Ok(renders)
}

/// Scans a dataset root, producing one [`RenderSet`] per object directory,
/// sorted by UID. Non-directory entries under the root are ignored.
pub fn scan_dataset(root: &Path) -> Result<Vec<RenderSet>> {
    if !root.is_dir() {
        return Err(RenderStoreError::DatasetError(format!(
            "dataset path '{}' is not a directory",
            root.display()
        )));
    }

    let mut sets = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| {
            RenderStoreError::DatasetError(format!(
                "failed to read dataset entry under '{}': {}",
                root.display(),
                e
            ))
        })?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let object_uid = entry.file_name().to_string_lossy().to_string();
        let dir = entry.path().to_path_buf();
        let renders = list_renders(&dir)?;
        sets.push(RenderSet {
            object_uid,
            dir,
            renders,
        });
    }
    Ok(sets)
}

/// Counts the immediate entries of a directory, files and directories alike.
///
/// This mirrors how upload progress is tracked: one entry per object.
pub fn entry_count(path: &Path) -> Result<usize> {
    Ok(fs::read_dir(path)?.count())
}

/// Path of the embedding sidecar belonging to a render image.
pub fn sidecar_path(render: &Path) -> PathBuf {
    render.with_extension("json")
}

/// Reads a render's embedding from its JSON sidecar and checks its length.
pub fn read_sidecar_vector(render: &Path, expected_dim: usize) -> Result<Vec<f32>> {
    let path = sidecar_path(render);
    let file = File::open(&path).map_err(|e| {
        RenderStoreError::DatasetError(format!(
            "missing embedding sidecar '{}': {}",
            path.display(),
            e
        ))
    })?;
    let vector: Vec<f32> = serde_json::from_reader(BufReader::new(file))?;
    if vector.len() != expected_dim {
        return Err(RenderStoreError::DimensionMismatch {
            path,
            expected: expected_dim,
            found: vector.len(),
        });
    }
    Ok(vector)
}

/// Derives the deterministic point id of a render from its object's dataset
/// UID and the render's file name.
pub fn derive_render_id(object_uid: &str, file_name: &str) -> Uuid {
    let seed = format!("{}_{}", object_uid, file_name);
    Uuid::new_v5(&Uuid::NAMESPACE_DNS, seed.as_bytes())
}

/// Derives the deterministic point id of an object from its dataset UID.
pub fn derive_object_id(object_uid: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_DNS, object_uid.as_bytes())
}

/// Component-wise mean of a set of vectors.
///
/// Returns `None` for an empty set or when the lengths disagree. Components
/// accumulate in f64 before narrowing back to f32.
pub fn mean_vector(vectors: &[Vec<f32>]) -> Option<Vec<f32>> {
    let first = vectors.first()?;
    let dim = first.len();
    let mut acc = vec![0f64; dim];
    for vector in vectors {
        if vector.len() != dim {
            return None;
        }
        for (slot, value) in acc.iter_mut().zip(vector.iter()) {
            *slot += f64::from(*value);
        }
    }
    let n = vectors.len() as f64;
    Some(acc.into_iter().map(|sum| (sum / n) as f32).collect())
}
