use anyhow::{bail, Result};
use clap::Args;
use colored::*;
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::{PointId, ScoredPoint};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::constants::{FIELD_CAPTION, FIELD_DATASET_UID};
use crate::error::RenderStoreError;
use crate::store::ops::{fetch_object, named_vectors, point_id_for, search_near};
use crate::store::QdrantClientTrait;

/// Arguments for the `similar` command.
#[derive(Args, Debug)]
pub struct SimilarArgs {
    /// Id (UUID) of the anchor object
    pub id: String,

    /// Number of neighbours to print
    #[arg(long, default_value_t = 5)]
    pub limit: u64,

    /// Collection to search (defaults to the objects collection)
    #[arg(long)]
    pub collection: Option<String>,
}

/// Searches for the points nearest to a stored one, using its own embedding
/// as the query vector. The anchor itself is dropped from the results.
pub async fn handle_similar<C>(args: &SimilarArgs, config: &AppConfig, client: Arc<C>) -> Result<()>
where
    C: QdrantClientTrait + Send + Sync + 'static,
{
    let id = Uuid::parse_str(args.id.trim())
        .map_err(|_| RenderStoreError::InvalidObjectId(args.id.clone()))?;
    let collection = args
        .collection
        .as_deref()
        .unwrap_or(config.collections.objects.as_str());
    let vector_name = config.collections.vector_name.as_str();
    let timeout = config.timeouts.query();

    let anchor = fetch_object(client.as_ref(), collection, &id, true, timeout)
        .await?
        .ok_or_else(|| RenderStoreError::ObjectNotFound(args.id.clone()))?;
    let mut vectors = named_vectors(anchor.vectors, vector_name);
    let vector = match vectors.remove(vector_name) {
        Some(vector) => vector,
        None => bail!(
            "Object '{}' carries no vector under slot '{}'",
            id,
            vector_name
        ),
    };

    // One extra hit, since the anchor scores highest against itself.
    let hits = search_near(
        client.as_ref(),
        collection,
        vector_name,
        vector,
        args.limit + 1,
        timeout,
    )
    .await?;
    let neighbours = without_anchor(hits, &point_id_for(&id), args.limit as usize);

    if neighbours.is_empty() {
        println!("No neighbours found for {}", id.to_string().cyan());
        return Ok(());
    }

    println!(
        "{} nearest to {}",
        "Objects".bold().blue(),
        id.to_string().cyan()
    );
    for (rank, hit) in neighbours.iter().enumerate() {
        let point_id = hit
            .id
            .as_ref()
            .map(format_point_id)
            .unwrap_or_else(|| "<missing id>".to_string());
        let uid = hit
            .payload
            .get(FIELD_DATASET_UID)
            .and_then(|v| v.as_str().map(String::from));
        let caption = hit
            .payload
            .get(FIELD_CAPTION)
            .and_then(|v| v.as_str().map(String::from));

        let mut line = format!(
            "{:>2}. {} {}",
            rank + 1,
            format!("{:.4}", hit.score).yellow(),
            point_id.cyan()
        );
        if let Some(uid) = uid {
            line.push_str(&format!("  {}", uid));
        }
        if let Some(caption) = caption {
            line.push_str(&format!("  {}", caption.dimmed()));
        }
        println!("{}", line);
    }
    Ok(())
}

/// Drops the anchor point from a hit list and truncates it to `limit`.
fn without_anchor(hits: Vec<ScoredPoint>, anchor: &PointId, limit: usize) -> Vec<ScoredPoint> {
    hits.into_iter()
        .filter(|hit| hit.id.as_ref() != Some(anchor))
        .take(limit)
        .collect()
}

fn format_point_id(id: &PointId) -> String {
    match &id.point_id_options {
        Some(PointIdOptions::Uuid(uuid)) => uuid.clone(),
        Some(PointIdOptions::Num(num)) => num.to_string(),
        None => "<missing id>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::client_trait::MockQdrantClientTrait;
    use qdrant_client::qdrant::vectors_output::VectorsOptions;
    use qdrant_client::qdrant::{
        GetResponse, NamedVectorsOutput, RetrievedPoint, SearchResponse, VectorOutput,
        VectorsOutput,
    };
    use std::collections::HashMap;

    fn scored(id: &Uuid, score: f32) -> ScoredPoint {
        ScoredPoint {
            id: Some(point_id_for(id)),
            score,
            ..Default::default()
        }
    }

    fn anchor_response(id: &Uuid, vector_name: &str) -> GetResponse {
        let mut slots = HashMap::new();
        slots.insert(
            vector_name.to_string(),
            VectorOutput {
                data: vec![0.1, 0.2, 0.3],
                ..Default::default()
            },
        );
        let point = RetrievedPoint {
            id: Some(point_id_for(id)),
            vectors: Some(VectorsOutput {
                vectors_options: Some(VectorsOptions::Vectors(NamedVectorsOutput {
                    vectors: slots,
                })),
            }),
            ..Default::default()
        };
        GetResponse {
            result: vec![point],
            ..Default::default()
        }
    }

    #[test]
    fn test_without_anchor_drops_the_anchor_and_truncates() {
        let anchor = Uuid::new_v4();
        let near = Uuid::new_v4();
        let far = Uuid::new_v4();
        let hits = vec![
            scored(&anchor, 1.0),
            scored(&near, 0.9),
            scored(&far, 0.4),
        ];

        let neighbours = without_anchor(hits, &point_id_for(&anchor), 1);
        assert_eq!(neighbours.len(), 1);
        assert_eq!(neighbours[0].id, Some(point_id_for(&near)));
    }

    #[tokio::test]
    async fn test_similar_searches_with_the_anchor_vector() {
        let id = Uuid::new_v4();
        let neighbour = Uuid::new_v4();

        let mut mock = MockQdrantClientTrait::new();
        let anchor_id = id;
        mock.expect_get_points()
            .times(1)
            .returning(move |_| Ok(anchor_response(&anchor_id, "default")));
        mock.expect_search_points()
            .withf(|request| {
                request.vector == vec![0.1, 0.2, 0.3]
                    && request.vector_name == Some("default".to_string())
                    && request.limit == 6
            })
            .times(1)
            .returning(move |_| {
                Ok(SearchResponse {
                    result: vec![scored(&id, 1.0), scored(&neighbour, 0.8)],
                    ..Default::default()
                })
            });

        let args = SimilarArgs {
            id: id.to_string(),
            limit: 5,
            collection: None,
        };
        handle_similar(&args, &AppConfig::default(), Arc::new(mock))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_similar_fails_when_anchor_has_no_vector() {
        let id = Uuid::new_v4();
        let mut mock = MockQdrantClientTrait::new();
        mock.expect_get_points().times(1).returning(|_| {
            let point = RetrievedPoint {
                vectors: None,
                ..Default::default()
            };
            Ok(GetResponse {
                result: vec![point],
                ..Default::default()
            })
        });
        mock.expect_search_points().times(0);

        let args = SimilarArgs {
            id: id.to_string(),
            limit: 5,
            collection: None,
        };
        let result = handle_similar(&args, &AppConfig::default(), Arc::new(mock)).await;
        assert!(result.is_err());
    }
}
