use qdrant_client::Qdrant;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::{RenderStoreError, Result};
use crate::store::client_trait::QdrantClientTrait;

/// A scoped connection to the vector store.
///
/// Connecting runs the HTTP liveness probe and a gRPC health check up front,
/// so a session in hand is one that answered both. The underlying channel is
/// released when the last clone of the inner client goes out of scope.
pub struct StoreSession<C: QdrantClientTrait + Send + Sync> {
    client: Arc<C>,
    endpoint: String,
}

impl StoreSession<Qdrant> {
    /// Opens a session against the endpoints in `config`, failing fast with
    /// [`RenderStoreError::NotLive`] when the store does not answer.
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        probe_http_liveness(config).await?;

        let endpoint = config.grpc_url();
        let client = Qdrant::from_url(&endpoint)
            .connect_timeout(config.timeouts.init())
            .timeout(config.timeouts.insert())
            .build()?;
        verify_live(&client).await?;

        debug!("Opened vector store session for {}", endpoint);
        Ok(Self {
            client: Arc::new(client),
            endpoint,
        })
    }
}

impl<C: QdrantClientTrait + Send + Sync> StoreSession<C> {
    /// Wraps an already-built client without probing it. Command handlers that
    /// received a client from elsewhere (and tests) come through here.
    pub fn with_client(client: Arc<C>, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// A shared handle to the underlying client.
    pub fn client(&self) -> Arc<C> {
        Arc::clone(&self.client)
    }

    /// The gRPC endpoint this session talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl<C: QdrantClientTrait + Send + Sync> Drop for StoreSession<C> {
    fn drop(&mut self) {
        debug!("Released vector store session for {}", self.endpoint);
    }
}

/// Probes the store's HTTP liveness endpoint. Any failure, including a
/// connect timeout, collapses into [`RenderStoreError::NotLive`] so callers
/// surface the one fixed message.
async fn probe_http_liveness(config: &AppConfig) -> Result<()> {
    let url = format!("{}/healthz", config.http_url());
    let client = reqwest::Client::builder()
        .timeout(config.timeouts.init())
        .build()?;
    match client.get(&url).send().await {
        Ok(response) if response.status().is_success() => Ok(()),
        Ok(response) => {
            debug!(
                "Liveness probe against {} answered with status {}",
                url,
                response.status()
            );
            Err(RenderStoreError::NotLive)
        }
        Err(e) => {
            debug!("Liveness probe against {} failed: {}", url, e);
            Err(RenderStoreError::NotLive)
        }
    }
}

/// Confirms the gRPC side answers its health check.
async fn verify_live<C: QdrantClientTrait>(client: &C) -> Result<()> {
    match client.health_check().await {
        Ok(_) => Ok(()),
        Err(e) => {
            debug!("Health check against the vector store failed: {}", e);
            Err(RenderStoreError::NotLive)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::LIVENESS_FAILURE_MESSAGE;
    use crate::store::client_trait::MockQdrantClientTrait;
    use qdrant_client::qdrant::HealthCheckReply;

    #[tokio::test]
    async fn test_verify_live_passes_on_healthy_store() {
        let mut mock = MockQdrantClientTrait::new();
        mock.expect_health_check()
            .times(1)
            .returning(|| Ok(HealthCheckReply::default()));

        assert!(verify_live(&mock).await.is_ok());
    }

    #[tokio::test]
    async fn test_verify_live_maps_failure_to_fixed_message() {
        let mut mock = MockQdrantClientTrait::new();
        mock.expect_health_check().times(1).returning(|| {
            Err(RenderStoreError::QdrantOperationError(
                "channel refused".to_string(),
            ))
        });

        let err = verify_live(&mock).await.unwrap_err();
        assert!(matches!(err, RenderStoreError::NotLive));
        assert_eq!(err.to_string(), LIVENESS_FAILURE_MESSAGE);
    }

    #[tokio::test]
    async fn test_session_releases_client_on_drop() {
        let client = Arc::new(MockQdrantClientTrait::new());
        assert_eq!(Arc::strong_count(&client), 1);

        let session = StoreSession::with_client(Arc::clone(&client), "http://localhost:6334");
        assert_eq!(Arc::strong_count(&client), 2);
        assert_eq!(session.endpoint(), "http://localhost:6334");

        drop(session);
        assert_eq!(Arc::strong_count(&client), 1);
    }

    #[tokio::test]
    async fn test_session_releases_client_when_work_errors() {
        let client = Arc::new(MockQdrantClientTrait::new());

        let outcome: Result<()> = async {
            let _session =
                StoreSession::with_client(Arc::clone(&client), "http://localhost:6334");
            Err(RenderStoreError::Other("simulated failure".to_string()))
        }
        .await;

        assert!(outcome.is_err());
        assert_eq!(Arc::strong_count(&client), 1);
    }
}
