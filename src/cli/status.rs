use anyhow::Result;
use clap::Args;
use colored::*;
use qdrant_client::qdrant::CollectionStatus;
use serde::Serialize;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::store::ops::count_points;
use crate::store::QdrantClientTrait;

/// Arguments for the `status` command.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Emit the report as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize, Debug)]
struct CollectionReport {
    name: String,
    exists: bool,
    points: u64,
    status: Option<String>,
}

#[derive(Serialize, Debug)]
struct StatusReport {
    collections: Vec<CollectionReport>,
    total_points: u64,
}

/// Reports exact point counts per collection and the total across both.
pub async fn handle_status<C>(args: &StatusArgs, config: &AppConfig, client: Arc<C>) -> Result<()>
where
    C: QdrantClientTrait + Send + Sync + 'static,
{
    let timeout = config.timeouts.query();
    let mut report = StatusReport {
        collections: Vec::new(),
        total_points: 0,
    };

    for name in [
        config.collections.renders.as_str(),
        config.collections.objects.as_str(),
    ] {
        if !client.collection_exists(name.to_string()).await? {
            report.collections.push(CollectionReport {
                name: name.to_string(),
                exists: false,
                points: 0,
                status: None,
            });
            continue;
        }

        let info = client.get_collection_info(name.to_string()).await?;
        let status = CollectionStatus::try_from(info.status)
            .map(|s| format!("{:?}", s))
            .ok();
        let points = count_points(client.as_ref(), name, timeout).await?;
        report.total_points += points;
        report.collections.push(CollectionReport {
            name: name.to_string(),
            exists: true,
            points,
            status,
        });
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", "Vector Store Status".bold().blue());
    println!("  Endpoint: {}", config.grpc_url().cyan());
    for collection in &report.collections {
        if !collection.exists {
            println!("  {}: {}", collection.name.cyan(), "not found".red());
            continue;
        }
        let status = collection.status.as_deref().unwrap_or("Unknown");
        println!(
            "  {}: {} points ({})",
            collection.name.cyan(),
            collection.points.to_string().yellow(),
            status
        );
    }
    println!(
        "  {}: {} points",
        "Total".bold(),
        report.total_points.to_string().yellow()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::client_trait::MockQdrantClientTrait;
    use qdrant_client::qdrant::{CollectionInfo, CountResponse, CountResult};

    fn count_response(count: u64) -> CountResponse {
        CountResponse {
            result: Some(CountResult {
                count,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_status_totals_both_collections() {
        let mut mock = MockQdrantClientTrait::new();
        mock.expect_collection_exists()
            .times(2)
            .returning(|_| Ok(true));
        mock.expect_get_collection_info().times(2).returning(|_| {
            Ok(CollectionInfo {
                status: CollectionStatus::Green as i32,
                ..Default::default()
            })
        });
        mock.expect_count()
            .withf(|request| request.collection_name == "renders")
            .times(1)
            .returning(|_| Ok(count_response(10)));
        mock.expect_count()
            .withf(|request| request.collection_name == "objects")
            .times(1)
            .returning(|_| Ok(count_response(5)));

        let args = StatusArgs { json: false };
        handle_status(&args, &AppConfig::default(), Arc::new(mock))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_status_reports_missing_collections() {
        let mut mock = MockQdrantClientTrait::new();
        mock.expect_collection_exists()
            .times(2)
            .returning(|_| Ok(false));
        mock.expect_get_collection_info().times(0);
        mock.expect_count().times(0);

        let args = StatusArgs { json: true };
        handle_status(&args, &AppConfig::default(), Arc::new(mock))
            .await
            .unwrap();
    }
}
