use anyhow::Result;
use clap::Args;
use colored::*;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::constants::VECTOR_PREVIEW_LEN;
use crate::error::RenderStoreError;
use crate::store::ops::{fetch_object, named_vectors};
use crate::store::QdrantClientTrait;

/// Arguments for the `inspect` command.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Id (UUID) of the point to fetch
    pub id: String,

    /// Collection to fetch from (defaults to the objects collection)
    #[arg(long)]
    pub collection: Option<String>,

    /// Also fetch the stored vectors and describe them
    #[arg(long)]
    pub vector: bool,
}

/// Fetches one point by id and prints its payload, and with `--vector` a
/// short description of each stored vector slot.
pub async fn handle_inspect<C>(args: &InspectArgs, config: &AppConfig, client: Arc<C>) -> Result<()>
where
    C: QdrantClientTrait + Send + Sync + 'static,
{
    let id = Uuid::parse_str(args.id.trim())
        .map_err(|_| RenderStoreError::InvalidObjectId(args.id.clone()))?;
    let collection = args
        .collection
        .as_deref()
        .unwrap_or(config.collections.objects.as_str());

    let point = fetch_object(
        client.as_ref(),
        collection,
        &id,
        args.vector,
        config.timeouts.query(),
    )
    .await?
    .ok_or_else(|| RenderStoreError::ObjectNotFound(args.id.clone()))?;

    println!("{} {}", "Object".bold().blue(), id.to_string().cyan());
    println!("  {}: {}", "collection".cyan(), collection);

    let mut keys: Vec<&String> = point.payload.keys().collect();
    keys.sort();
    for key in keys {
        if let Some(value) = point.payload.get(key) {
            println!("  {}: {}", key.cyan(), format_payload_value(value));
        }
    }

    if args.vector {
        let vectors = named_vectors(point.vectors, config.collections.vector_name.as_str());
        if vectors.is_empty() {
            println!("  {}", "no vectors stored".yellow());
        }
        for (name, data) in vectors {
            println!(
                "  {} '{}': {}",
                "vector".cyan(),
                name,
                describe_vector(&data)
            );
        }
    }
    Ok(())
}

fn format_payload_value(value: &Value) -> String {
    match &value.kind {
        Some(Kind::StringValue(s)) => s.clone(),
        Some(Kind::IntegerValue(i)) => i.to_string(),
        Some(Kind::DoubleValue(d)) => d.to_string(),
        Some(Kind::BoolValue(b)) => b.to_string(),
        Some(other) => format!("{:?}", other),
        None => "null".to_string(),
    }
}

/// Element type, length, and the first few components of a stored vector.
fn describe_vector(data: &[f32]) -> String {
    let preview: Vec<String> = data
        .iter()
        .take(VECTOR_PREVIEW_LEN)
        .map(|v| format!("{:.4}", v))
        .collect();
    if data.len() > VECTOR_PREVIEW_LEN {
        format!("f32[{}] [{}, ...]", data.len(), preview.join(", "))
    } else {
        format!("f32[{}] [{}]", data.len(), preview.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::client_trait::MockQdrantClientTrait;
    use crate::store::ops::point_id_for;
    use qdrant_client::qdrant::vectors_output::VectorsOptions;
    use qdrant_client::qdrant::{
        GetResponse, NamedVectorsOutput, RetrievedPoint, VectorOutput, VectorsOutput,
    };
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_inspect_rejects_invalid_id() {
        let mock = MockQdrantClientTrait::new();
        let args = InspectArgs {
            id: "not-a-uuid".to_string(),
            collection: None,
            vector: false,
        };

        let err = handle_inspect(&args, &AppConfig::default(), Arc::new(mock))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RenderStoreError>(),
            Some(RenderStoreError::InvalidObjectId(_))
        ));
    }

    #[tokio::test]
    async fn test_inspect_reports_missing_object() {
        let mut mock = MockQdrantClientTrait::new();
        mock.expect_get_points()
            .times(1)
            .returning(|_| Ok(GetResponse::default()));

        let args = InspectArgs {
            id: Uuid::new_v4().to_string(),
            collection: None,
            vector: false,
        };
        let err = handle_inspect(&args, &AppConfig::default(), Arc::new(mock))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RenderStoreError>(),
            Some(RenderStoreError::ObjectNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_inspect_prints_payload_and_vectors() {
        let id = Uuid::new_v4();
        let mut mock = MockQdrantClientTrait::new();
        mock.expect_get_points()
            .withf(|request| request.with_vectors == Some(true.into()))
            .times(1)
            .returning(move |_| {
                let mut payload = HashMap::new();
                payload.insert(
                    "dataset_uid".to_string(),
                    Value {
                        kind: Some(Kind::StringValue("chair-001".to_string())),
                    },
                );
                let mut slots = HashMap::new();
                slots.insert(
                    "default".to_string(),
                    VectorOutput {
                        data: vec![0.1; 8],
                        ..Default::default()
                    },
                );
                let point = RetrievedPoint {
                    id: Some(point_id_for(&id)),
                    payload,
                    vectors: Some(VectorsOutput {
                        vectors_options: Some(VectorsOptions::Vectors(NamedVectorsOutput {
                            vectors: slots,
                        })),
                    }),
                    ..Default::default()
                };
                Ok(GetResponse {
                    result: vec![point],
                    ..Default::default()
                })
            });

        let args = InspectArgs {
            id: id.to_string(),
            collection: None,
            vector: true,
        };
        handle_inspect(&args, &AppConfig::default(), Arc::new(mock))
            .await
            .unwrap();
    }

    #[test]
    fn test_describe_vector_previews_long_vectors() {
        let description = describe_vector(&[0.5; 512]);
        assert!(description.starts_with("f32[512] ["));
        assert!(description.ends_with(", ...]"));
        assert_eq!(description.matches("0.5000").count(), VECTOR_PREVIEW_LEN);
    }

    #[test]
    fn test_describe_vector_prints_short_vectors_whole() {
        let description = describe_vector(&[1.0, 2.0]);
        assert_eq!(description, "f32[2] [1.0000, 2.0000]");
    }

    #[test]
    fn test_format_payload_value_kinds() {
        let string = Value {
            kind: Some(Kind::StringValue("a chair".to_string())),
        };
        assert_eq!(format_payload_value(&string), "a chair");

        let integer = Value {
            kind: Some(Kind::IntegerValue(24)),
        };
        assert_eq!(format_payload_value(&integer), "24");

        let empty = Value { kind: None };
        assert_eq!(format_payload_value(&empty), "null");
    }
}
