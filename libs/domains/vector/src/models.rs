use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Query parameters naming one collection.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CollectionQuery {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub collection_name: String,
}

impl CollectionQuery {
    pub fn new(collection_name: impl Into<String>) -> Self {
        Self {
            collection_name: collection_name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CollectionSummary {
    pub name: String,
}

/// `results` payload of `/get-all-collections/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CollectionsList {
    pub collections: Vec<CollectionSummary>,
}

impl From<Vec<String>> for CollectionsList {
    fn from(names: Vec<String>) -> Self {
        Self {
            collections: names
                .into_iter()
                .map(|name| CollectionSummary { name })
                .collect(),
        }
    }
}

impl CollectionsList {
    pub fn names(&self) -> Vec<String> {
        self.collections.iter().map(|c| c.name.clone()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CollectionStatus {
    Green,
    Yellow,
    Red,
    Grey,
}

/// Collection metadata as reported by the vector store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CollectionInfo {
    pub name: String,
    pub status: CollectionStatus,
    pub points_count: Option<u64>,
    pub segments_count: u64,
    /// Dimension of the (first) dense vector.
    pub vector_size: Option<u64>,
    /// Distance function name, e.g. `Cosine`.
    pub distance: Option<String>,
}

/// A search hit with its similarity score and payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ScoredPoint {
    pub id: String,
    pub score: f32,
    /// Document text found in the payload, if any.
    pub text: Option<String>,
    #[schema(value_type = Object)]
    pub payload: serde_json::Value,
}

/// One embedding vector with its token cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EmbeddingResult {
    pub values: Vec<f32>,
    pub dimension: u32,
    pub tokens_used: u32,
}

/// Pull document text out of a point payload.
///
/// Looks at `text`, then `content`, then the `text` field of a JSON string
/// stored under `_node_content` (LlamaIndex layout).
pub fn payload_text(payload: &serde_json::Value) -> Option<String> {
    for key in ["text", "content"] {
        if let Some(text) = payload.get(key).and_then(|v| v.as_str()) {
            return Some(text.to_string());
        }
    }

    let node_content = payload.get("_node_content")?;
    let node: serde_json::Value = match node_content {
        serde_json::Value::String(raw) => serde_json::from_str(raw).ok()?,
        other => other.clone(),
    };
    node.get("text")
        .and_then(|v| v.as_str())
        .map(str::to_string)
}
