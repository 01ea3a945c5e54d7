//! The dataset load pipeline.
//!
//! Walks a dataset directory, turns every render into a point in the renders
//! collection, averages each object's render embeddings into one point in the
//! objects collection, and attaches captions from the caption index along the
//! way. Point ids are deterministic, so re-running a load overwrites rather
//! than duplicates.

use indicatif::{ProgressBar, ProgressStyle};
use qdrant_client::qdrant::vectors::VectorsOptions;
use qdrant_client::qdrant::{NamedVectors, PointStruct, Vectors};
use qdrant_client::Payload;
use std::path::Path;

use crate::captions::CaptionIndex;
use crate::config::AppConfig;
use crate::constants::{FIELD_CAPTION, FIELD_DATASET_UID, FIELD_RENDER_COUNT, FIELD_SOURCE_FILE};
use crate::dataset::{
    derive_object_id, derive_render_id, mean_vector, read_sidecar_vector, scan_dataset, RenderSet,
};
use crate::error::{RenderStoreError, Result};
use crate::store::ops::{delete_points_by_ids, ensure_collection, point_id_for, upsert_batch};
use crate::store::QdrantClientTrait;

/// Tally of what one load run did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    /// Object mean points written.
    pub objects: usize,
    /// Per-render points written.
    pub renders: usize,
    /// Object directories skipped for lack of usable renders.
    pub skipped_objects: usize,
    /// Objects the caption index had no entry for.
    pub missing_captions: usize,
    /// Per-render points submitted for deletion.
    pub deleted_renders: usize,
}

/// Everything usable gathered from one object directory.
struct CollectedObject {
    file_names: Vec<String>,
    vectors: Vec<Vec<f32>>,
    mean: Vec<f32>,
}

/// Loads `dataset_dir` into the renders and objects collections.
///
/// With `delete_renders` set, per-render points are not written; instead
/// their deterministic ids are deleted once the object points are in, so a
/// previously loaded dataset collapses to object points only.
pub async fn load_dataset<C>(
    client: &C,
    config: &AppConfig,
    dataset_dir: &Path,
    captions: &CaptionIndex,
    delete_renders: bool,
    batch_size: usize,
) -> Result<LoadSummary>
where
    C: QdrantClientTrait + Send + Sync + 'static,
{
    let sets = scan_dataset(dataset_dir)?;
    if sets.is_empty() {
        warn!(
            "No object directories found under '{}'",
            dataset_dir.display()
        );
        return Ok(LoadSummary::default());
    }

    let renders_collection = config.collections.renders.as_str();
    let objects_collection = config.collections.objects.as_str();
    let vector_name = config.collections.vector_name.as_str();
    let dimension = config.collections.vector_dimension;

    ensure_collection(client, renders_collection, vector_name, dimension).await?;
    ensure_collection(client, objects_collection, vector_name, dimension).await?;

    let batch_size = batch_size.max(1);
    let pb = ProgressBar::new(sets.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec}, {eta}) {msg}",
            )
            .map_err(|e| RenderStoreError::Other(e.to_string()))?
            .progress_chars("#=-"),
    );

    let mut summary = LoadSummary::default();
    let mut render_batch: Vec<PointStruct> = Vec::with_capacity(batch_size);
    let mut object_batch: Vec<PointStruct> = Vec::with_capacity(batch_size);
    let mut render_ids_to_delete = Vec::new();

    for set in &sets {
        pb.set_message(set.object_uid.clone());

        let collected = match collect_object(set, dimension as usize)? {
            Some(collected) => collected,
            None => {
                summary.skipped_objects += 1;
                pb.inc(1);
                continue;
            }
        };

        let caption = captions.get(&set.object_uid);
        if caption.is_none() && !captions.is_empty() {
            summary.missing_captions += 1;
            warn!("No caption for dataset UID '{}'", set.object_uid);
        }

        let CollectedObject {
            file_names,
            vectors,
            mean,
        } = collected;
        let render_count = vectors.len();

        for (file_name, vector) in file_names.iter().zip(vectors) {
            let render_id = derive_render_id(&set.object_uid, file_name);
            if delete_renders {
                render_ids_to_delete.push(point_id_for(&render_id));
                continue;
            }

            let mut payload = Payload::new();
            payload.insert(FIELD_DATASET_UID, set.object_uid.as_str());
            payload.insert(FIELD_SOURCE_FILE, file_name.as_str());
            if let Some(caption) = caption {
                payload.insert(FIELD_CAPTION, caption);
            }
            render_batch.push(PointStruct::new(
                render_id.to_string(),
                named_point_vectors(vector_name, vector),
                payload,
            ));
            summary.renders += 1;

            if render_batch.len() >= batch_size {
                let batch = std::mem::replace(&mut render_batch, Vec::with_capacity(batch_size));
                upsert_batch(client, renders_collection, batch).await?;
            }
        }

        let object_id = derive_object_id(&set.object_uid);
        let mut payload = Payload::new();
        payload.insert(FIELD_DATASET_UID, set.object_uid.as_str());
        if let Some(caption) = caption {
            payload.insert(FIELD_CAPTION, caption);
        }
        payload.insert(FIELD_RENDER_COUNT, render_count as i64);
        object_batch.push(PointStruct::new(
            object_id.to_string(),
            named_point_vectors(vector_name, mean),
            payload,
        ));
        summary.objects += 1;

        if object_batch.len() >= batch_size {
            let batch = std::mem::replace(&mut object_batch, Vec::with_capacity(batch_size));
            upsert_batch(client, objects_collection, batch).await?;
        }

        pb.inc(1);
    }

    upsert_batch(client, renders_collection, render_batch).await?;
    upsert_batch(client, objects_collection, object_batch).await?;

    if delete_renders && !render_ids_to_delete.is_empty() {
        summary.deleted_renders =
            delete_points_by_ids(client, renders_collection, &render_ids_to_delete, batch_size)
                .await?;
    }

    pb.finish_with_message(format!(
        "{} objects, {} renders",
        summary.objects, summary.renders
    ));
    info!(
        "Loaded {} object points and {} render points from '{}' ({} objects skipped)",
        summary.objects,
        summary.renders,
        dataset_dir.display(),
        summary.skipped_objects
    );
    Ok(summary)
}

/// Reads the embeddings of one object directory.
///
/// Renders with a missing or unreadable sidecar are dropped with a warning.
/// A sidecar of the wrong length marks the whole object unusable, since its
/// mean would mix dimensions. `Ok(None)` means skip this object.
fn collect_object(set: &RenderSet, dimension: usize) -> Result<Option<CollectedObject>> {
    if set.renders.is_empty() {
        warn!("Object '{}' has no renders; skipping", set.object_uid);
        return Ok(None);
    }

    let mut file_names = Vec::with_capacity(set.renders.len());
    let mut vectors = Vec::with_capacity(set.renders.len());
    for render in &set.renders {
        let file_name = match render.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => continue,
        };
        match read_sidecar_vector(render, dimension) {
            Ok(vector) => {
                file_names.push(file_name);
                vectors.push(vector);
            }
            Err(RenderStoreError::DatasetError(msg)) => {
                warn!("{}; skipping render", msg);
            }
            Err(RenderStoreError::SerializationError(e)) => {
                warn!(
                    "Unreadable embedding sidecar for '{}': {}; skipping render",
                    render.display(),
                    e
                );
            }
            Err(e @ RenderStoreError::DimensionMismatch { .. }) => {
                error!("{}; skipping object '{}'", e, set.object_uid);
                return Ok(None);
            }
            Err(e) => return Err(e),
        }
    }

    if vectors.is_empty() {
        warn!(
            "Object '{}' has no usable renders; skipping",
            set.object_uid
        );
        return Ok(None);
    }

    let mean = match mean_vector(&vectors) {
        Some(mean) => mean,
        None => {
            warn!(
                "Could not average render vectors for object '{}'; skipping",
                set.object_uid
            );
            return Ok(None);
        }
    };

    Ok(Some(CollectedObject {
        file_names,
        vectors,
        mean,
    }))
}

/// Wraps an embedding into the named-slot shape points are stored with.
fn named_point_vectors(vector_name: &str, vector: Vec<f32>) -> Vectors {
    Vectors {
        vectors_options: Some(VectorsOptions::Vectors(
            NamedVectors::default().add_vector(vector_name, vector),
        )),
    }
}
