use std::collections::HashMap;

use async_trait::async_trait;
use qdrant_client::Qdrant;
use qdrant_client::qdrant::{self, SearchPointsBuilder, Value as QdrantValue};
use tracing::instrument;

use super::QdrantConfig;
use crate::error::{VectorError, VectorResult};
use crate::models::{CollectionInfo, CollectionStatus, ScoredPoint, payload_text};
use crate::repository::VectorStore;

/// Qdrant-backed implementation of [`VectorStore`] over gRPC.
pub struct QdrantStore {
    client: Qdrant,
}

impl QdrantStore {
    /// Build the client. No connection is made until the first call.
    pub fn new(config: QdrantConfig) -> VectorResult<Self> {
        let mut builder = Qdrant::from_url(&config.url).timeout(config.timeout);

        if let Some(api_key) = config.api_key {
            builder = builder.api_key(api_key);
        }

        let client = builder
            .build()
            .map_err(|e| VectorError::Config(format!("Failed to build Qdrant client: {}", e)))?;

        tracing::info!(url = %config.url, "Qdrant client configured");
        Ok(Self { client })
    }

    pub fn from_client(client: Qdrant) -> Self {
        Self { client }
    }

    fn point_id_to_string(point_id: Option<&qdrant::PointId>) -> String {
        match point_id.and_then(|id| id.point_id_options.as_ref()) {
            Some(qdrant::point_id::PointIdOptions::Uuid(uuid)) => uuid.clone(),
            Some(qdrant::point_id::PointIdOptions::Num(num)) => num.to_string(),
            None => String::new(),
        }
    }

    fn qdrant_to_payload(payload: HashMap<String, QdrantValue>) -> serde_json::Value {
        let map = payload
            .into_iter()
            .filter_map(|(key, val)| qdrant_value_to_json(val).map(|json| (key, json)))
            .collect();

        serde_json::Value::Object(map)
    }

    fn to_collection_info(name: &str, result: qdrant::CollectionInfo) -> CollectionInfo {
        let status = match result.status() {
            qdrant::CollectionStatus::Green => CollectionStatus::Green,
            qdrant::CollectionStatus::Yellow => CollectionStatus::Yellow,
            qdrant::CollectionStatus::Red => CollectionStatus::Red,
            _ => CollectionStatus::Grey,
        };

        let (vector_size, distance) = Self::extract_vector_params(&result.config);

        CollectionInfo {
            name: name.to_string(),
            status,
            points_count: result.points_count,
            segments_count: result.segments_count,
            vector_size,
            distance,
        }
    }

    fn extract_vector_params(
        config: &Option<qdrant::CollectionConfig>,
    ) -> (Option<u64>, Option<String>) {
        let vectors_config = config
            .as_ref()
            .and_then(|c| c.params.as_ref())
            .and_then(|p| p.vectors_config.as_ref())
            .and_then(|vc| vc.config.as_ref());

        let params = match vectors_config {
            Some(qdrant::vectors_config::Config::Params(p)) => Some(p),
            // Named vectors: report the first one.
            Some(qdrant::vectors_config::Config::ParamsMap(map)) => map.map.values().next(),
            None => None,
        };

        match params {
            Some(p) => (
                Some(p.size),
                Some(p.distance().as_str_name().to_string()),
            ),
            None => (None, None),
        }
    }
}

fn qdrant_value_to_json(val: QdrantValue) -> Option<serde_json::Value> {
    use qdrant::value::Kind;

    match val.kind? {
        Kind::NullValue(_) => Some(serde_json::Value::Null),
        Kind::BoolValue(b) => Some(serde_json::Value::Bool(b)),
        Kind::IntegerValue(i) => Some(serde_json::Value::Number(i.into())),
        Kind::DoubleValue(f) => serde_json::Number::from_f64(f).map(serde_json::Value::Number),
        Kind::StringValue(s) => Some(serde_json::Value::String(s)),
        Kind::ListValue(list) => Some(serde_json::Value::Array(
            list.values
                .into_iter()
                .filter_map(qdrant_value_to_json)
                .collect(),
        )),
        Kind::StructValue(st) => Some(serde_json::Value::Object(
            st.fields
                .into_iter()
                .filter_map(|(k, v)| qdrant_value_to_json(v).map(|json| (k, json)))
                .collect(),
        )),
    }
}

#[async_trait]
impl VectorStore for QdrantStore {
    #[instrument(skip(self))]
    async fn list_collections(&self) -> VectorResult<Vec<String>> {
        let response = self.client.list_collections().await?;

        Ok(response
            .collections
            .into_iter()
            .map(|collection| collection.name)
            .collect())
    }

    #[instrument(skip(self), fields(collection = %collection_name))]
    async fn collection_info(&self, collection_name: &str) -> VectorResult<CollectionInfo> {
        let response = self
            .client
            .collection_info(collection_name)
            .await
            .map_err(|e| match VectorError::from(e) {
                VectorError::CollectionNotFound(_) => {
                    VectorError::CollectionNotFound(collection_name.to_string())
                }
                other => other,
            })?;

        let result = response
            .result
            .ok_or_else(|| VectorError::CollectionNotFound(collection_name.to_string()))?;

        Ok(Self::to_collection_info(collection_name, result))
    }

    #[instrument(skip(self), fields(collection = %collection_name))]
    async fn collection_exists(&self, collection_name: &str) -> VectorResult<bool> {
        Ok(self.client.collection_exists(collection_name).await?)
    }

    #[instrument(skip(self, vector), fields(collection = %collection_name, limit))]
    async fn search(
        &self,
        collection_name: &str,
        vector: Vec<f32>,
        limit: u64,
    ) -> VectorResult<Vec<ScoredPoint>> {
        let builder = SearchPointsBuilder::new(collection_name, vector, limit).with_payload(true);

        let response = self.client.search_points(builder).await.map_err(|e| {
            match VectorError::from(e) {
                VectorError::CollectionNotFound(_) => {
                    VectorError::CollectionNotFound(collection_name.to_string())
                }
                other => other,
            }
        })?;

        Ok(response
            .result
            .into_iter()
            .map(|point| {
                let payload = Self::qdrant_to_payload(point.payload);
                ScoredPoint {
                    id: Self::point_id_to_string(point.id.as_ref()),
                    score: point.score,
                    text: payload_text(&payload),
                    payload,
                }
            })
            .collect())
    }

    async fn health_check(&self) -> VectorResult<()> {
        self.client.health_check().await?;
        Ok(())
    }
}
