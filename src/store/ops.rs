//! Point-level operations against the vector store, generic over the client
//! trait so they stay mockable.

use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::vectors_output::VectorsOptions;
use qdrant_client::qdrant::{
    CountPointsBuilder, DeletePointsBuilder, GetPoints, PointId, PointStruct, RetrievedPoint,
    ScoredPoint, SearchPoints, UpsertPointsBuilder, VectorsOutput,
};
use std::collections::BTreeMap;
use std::time::Duration;
use uuid::Uuid;

use crate::error::{RenderStoreError, Result};
use crate::store::client_trait::QdrantClientTrait;

/// Creates `collection_name` with a single named vector slot when it does not
/// exist yet. Returns `true` when a collection was actually created.
pub async fn ensure_collection<C>(
    client: &C,
    collection_name: &str,
    vector_name: &str,
    vector_dimension: u64,
) -> Result<bool>
where
    C: QdrantClientTrait + Send + Sync + 'static,
{
    if client.collection_exists(collection_name.to_string()).await? {
        debug!("Collection '{}' already exists", collection_name);
        return Ok(false);
    }

    info!(
        "Creating collection '{}' ({} dimensions under vector slot '{}')",
        collection_name, vector_dimension, vector_name
    );
    let created = client
        .create_collection(collection_name, vector_name, vector_dimension)
        .await?;
    if !created {
        return Err(RenderStoreError::QdrantOperationError(format!(
            "Vector store refused to create collection '{}'",
            collection_name
        )));
    }
    Ok(true)
}

/// Exact point count for a collection, bounded by `timeout`.
pub async fn count_points<C>(client: &C, collection_name: &str, timeout: Duration) -> Result<u64>
where
    C: QdrantClientTrait + Send + Sync + 'static,
{
    let request = CountPointsBuilder::new(collection_name).exact(true).build();
    let response = tokio::time::timeout(timeout, client.count(request))
        .await
        .map_err(|_| RenderStoreError::OperationTimeout {
            operation: "count".to_string(),
            secs: timeout.as_secs(),
        })??;
    Ok(response.result.map(|r| r.count).unwrap_or(0))
}

/// The store addresses points by UUID throughout, so ids are always built
/// through the `Uuid` variant rather than numeric ids.
pub fn point_id_for(id: &Uuid) -> PointId {
    PointId {
        point_id_options: Some(PointIdOptions::Uuid(id.to_string())),
    }
}

/// Fetches a single point by id. `with_vector` pulls the stored embeddings
/// along; payload is always included. Returns `None` when the id is unknown.
pub async fn fetch_object<C>(
    client: &C,
    collection_name: &str,
    id: &Uuid,
    with_vector: bool,
    timeout: Duration,
) -> Result<Option<RetrievedPoint>>
where
    C: QdrantClientTrait + Send + Sync + 'static,
{
    let request = GetPoints {
        collection_name: collection_name.to_string(),
        ids: vec![point_id_for(id)],
        with_payload: Some(true.into()),
        with_vectors: Some(with_vector.into()),
        timeout: Some(timeout.as_secs()),
        ..Default::default()
    };
    let response = client.get_points(request).await?;
    Ok(response.result.into_iter().next())
}

/// Flattens a point's vector output into `name -> values`, keyed by slot name.
/// An unnamed vector lands under `default_name` so callers can treat both
/// shapes uniformly.
pub fn named_vectors(
    vectors: Option<VectorsOutput>,
    default_name: &str,
) -> BTreeMap<String, Vec<f32>> {
    let mut map = BTreeMap::new();
    if let Some(options) = vectors.and_then(|v| v.vectors_options) {
        match options {
            VectorsOptions::Vector(vector) => {
                map.insert(default_name.to_string(), vector.data);
            }
            VectorsOptions::Vectors(named) => {
                for (name, vector) in named.vectors {
                    map.insert(name, vector.data);
                }
            }
        }
    }
    map
}

/// Upserts one batch of points, waiting for the store to apply it.
pub async fn upsert_batch<C>(
    client: &C,
    collection_name: &str,
    points: Vec<PointStruct>,
) -> Result<()>
where
    C: QdrantClientTrait + Send + Sync + 'static,
{
    if points.is_empty() {
        return Ok(());
    }
    debug!(
        "Upserting batch of {} points to \"{}\"",
        points.len(),
        collection_name
    );
    let request = UpsertPointsBuilder::new(collection_name, points).wait(true);
    client.upsert_points(request.build()).await?;
    Ok(())
}

/// Deletes the given point ids in batches of `batch_size`. Returns how many
/// ids were submitted for deletion.
pub async fn delete_points_by_ids<C>(
    client: &C,
    collection_name: &str,
    ids: &[PointId],
    batch_size: usize,
) -> Result<usize>
where
    C: QdrantClientTrait + Send + Sync + 'static,
{
    if ids.is_empty() {
        return Ok(0);
    }
    let mut deleted = 0;
    for chunk in ids.chunks(batch_size.max(1)) {
        let request = DeletePointsBuilder::new(collection_name)
            .points(chunk.to_vec())
            .wait(true);
        client.delete_points(request.build()).await?;
        deleted += chunk.len();
        debug!(
            "Deleted batch of {} points from \"{}\"",
            chunk.len(),
            collection_name
        );
    }
    Ok(deleted)
}

/// Nearest-neighbour search against one named vector slot, payload included.
pub async fn search_near<C>(
    client: &C,
    collection_name: &str,
    vector_name: &str,
    vector: Vec<f32>,
    limit: u64,
    timeout: Duration,
) -> Result<Vec<ScoredPoint>>
where
    C: QdrantClientTrait + Send + Sync + 'static,
{
    let request = SearchPoints {
        collection_name: collection_name.to_string(),
        vector,
        vector_name: Some(vector_name.to_string()),
        limit,
        with_payload: Some(true.into()),
        timeout: Some(timeout.as_secs()),
        ..Default::default()
    };
    let response = client.search_points(request).await?;
    Ok(response.result)
}
