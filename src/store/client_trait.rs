use async_trait::async_trait;
use qdrant_client::qdrant::{
    vectors_config, CollectionInfo, CountPoints, CountResponse, CreateCollection,
    DeleteCollection, DeletePoints, Distance, GetCollectionInfoRequest, GetPoints, GetResponse,
    HealthCheckReply, PointsOperationResponse, SearchPoints, SearchResponse, UpsertPoints,
    VectorParamsBuilder, VectorParamsMap, VectorsConfig,
};
use qdrant_client::Qdrant;
use std::collections::HashMap;

use crate::error::{RenderStoreError, Result};

/// The slice of the Qdrant API this tool consumes, behind a trait so command
/// handlers stay testable against a generated mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QdrantClientTrait: Send + Sync {
    /// Checks the health of the store over gRPC.
    async fn health_check(&self) -> Result<HealthCheckReply>;
    /// Checks if a collection exists.
    async fn collection_exists(&self, collection_name: String) -> Result<bool>;
    /// Creates a collection with a single named vector slot.
    async fn create_collection(
        &self,
        collection_name: &str,
        vector_name: &str,
        vector_dimension: u64,
    ) -> Result<bool>;
    /// Deletes a collection.
    async fn delete_collection(&self, collection_name: String) -> Result<bool>;
    /// Gets information about a collection.
    async fn get_collection_info(&self, collection_name: String) -> Result<CollectionInfo>;
    /// Counts the points in a collection.
    async fn count(&self, request: CountPoints) -> Result<CountResponse>;
    /// Retrieves points by id.
    async fn get_points(&self, request: GetPoints) -> Result<GetResponse>;
    /// Searches for the nearest points to a vector.
    async fn search_points(&self, request: SearchPoints) -> Result<SearchResponse>;
    /// Upserts points into a collection.
    async fn upsert_points(&self, request: UpsertPoints) -> Result<PointsOperationResponse>;
    /// Deletes points from a collection.
    async fn delete_points(&self, request: DeletePoints) -> Result<PointsOperationResponse>;
}

#[async_trait]
impl QdrantClientTrait for Qdrant {
    async fn health_check(&self) -> Result<HealthCheckReply> {
        self.health_check().await.map_err(RenderStoreError::QdrantError)
    }

    async fn collection_exists(&self, collection_name: String) -> Result<bool> {
        self.collection_exists(collection_name)
            .await
            .map_err(RenderStoreError::QdrantError)
    }

    async fn create_collection(
        &self,
        collection_name: &str,
        vector_name: &str,
        vector_dimension: u64,
    ) -> Result<bool> {
        let params = VectorParamsBuilder::new(vector_dimension, Distance::Cosine).build();
        let mut map = HashMap::new();
        map.insert(vector_name.to_string(), params);

        // Points always address their embedding through a named slot, so the
        // collection is created with a params map rather than a bare config.
        let request = CreateCollection {
            collection_name: collection_name.to_string(),
            vectors_config: Some(VectorsConfig {
                config: Some(vectors_config::Config::ParamsMap(VectorParamsMap { map })),
            }),
            ..Default::default()
        };

        let response = self
            .create_collection(request)
            .await
            .map_err(RenderStoreError::QdrantError)?;
        Ok(response.result)
    }

    async fn delete_collection(&self, collection_name: String) -> Result<bool> {
        let request = DeleteCollection {
            collection_name,
            ..Default::default()
        };
        Ok(self
            .delete_collection(request)
            .await
            .map_err(RenderStoreError::QdrantError)?
            .result)
    }

    async fn get_collection_info(&self, collection_name: String) -> Result<CollectionInfo> {
        let request = GetCollectionInfoRequest {
            collection_name: collection_name.clone(),
        };
        let response = self
            .collection_info(request)
            .await
            .map_err(RenderStoreError::QdrantError)?;
        match response.result {
            Some(info) => Ok(info),
            None => Err(RenderStoreError::CollectionNotFound(collection_name)),
        }
    }

    async fn count(&self, request: CountPoints) -> Result<CountResponse> {
        self.count(request).await.map_err(RenderStoreError::QdrantError)
    }

    async fn get_points(&self, request: GetPoints) -> Result<GetResponse> {
        self.get_points(request).await.map_err(RenderStoreError::QdrantError)
    }

    async fn search_points(&self, request: SearchPoints) -> Result<SearchResponse> {
        self.search_points(request)
            .await
            .map_err(RenderStoreError::QdrantError)
    }

    async fn upsert_points(&self, request: UpsertPoints) -> Result<PointsOperationResponse> {
        self.upsert_points(request)
            .await
            .map_err(RenderStoreError::QdrantError)
    }

    async fn delete_points(&self, request: DeletePoints) -> Result<PointsOperationResponse> {
        self.delete_points(request)
            .await
            .map_err(RenderStoreError::QdrantError)
    }
}
