use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

pub const DEFAULT_SIMILARITY_TOP_K: u64 = 4;

fn default_similarity_top_k() -> u64 {
    DEFAULT_SIMILARITY_TOP_K
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message(Cow::Borrowed("must not be empty")));
    }
    Ok(())
}

/// Body of `POST /query-collection/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct DocumentQuery {
    #[validate(custom(function = "not_blank"))]
    pub collection_name: String,
    #[validate(custom(function = "not_blank"))]
    pub question: String,
    /// Model that writes the answer; the relay's default when absent.
    #[serde(default)]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub llm_model_name: Option<String>,
    /// How many nearest chunks ground the answer.
    #[serde(default = "default_similarity_top_k")]
    #[validate(range(min = 1, max = 50, message = "must be between 1 and 50"))]
    pub similarity_top_k: u64,
}

impl DocumentQuery {
    pub fn new(collection_name: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            collection_name: collection_name.into(),
            question: question.into(),
            llm_model_name: None,
            similarity_top_k: DEFAULT_SIMILARITY_TOP_K,
        }
    }

    pub fn with_model(mut self, llm_model_name: impl Into<String>) -> Self {
        self.llm_model_name = Some(llm_model_name.into());
        self
    }

    pub fn with_similarity_top_k(mut self, similarity_top_k: u64) -> Self {
        self.similarity_top_k = similarity_top_k;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NodeContent {
    pub id: String,
    pub text: String,
}

/// A retrieved chunk and its similarity score, as stored (not normalized).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SourceNode {
    pub node: NodeContent,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct QueryResponse {
    pub response: String,
    pub source_nodes: Vec<SourceNode>,
}

/// `results` of `/query-collection/`; front-ends read `response.response`
/// and `response.source_nodes[].node.text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DocumentAnswer {
    pub response: QueryResponse,
}

impl DocumentAnswer {
    pub fn new(response: impl Into<String>, source_nodes: Vec<SourceNode>) -> Self {
        Self {
            response: QueryResponse {
                response: response.into(),
                source_nodes,
            },
        }
    }

    pub fn text(&self) -> &str {
        &self.response.response
    }

    pub fn source_nodes(&self) -> &[SourceNode] {
        &self.response.source_nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_similarity_top_k_defaults_to_four() {
        let query: DocumentQuery = serde_json::from_value(json!({
            "collection_name": "docs",
            "question": "What is the refund policy?",
            "llm_model_name": "gpt-4o-mini"
        }))
        .unwrap();

        assert_eq!(query.similarity_top_k, 4);
        assert!(query.validate().is_ok());
    }

    #[test]
    fn test_blank_fields_are_invalid() {
        assert!(DocumentQuery::new("", "question").validate().is_err());
        assert!(DocumentQuery::new("docs", "  ").validate().is_err());
        assert!(
            DocumentQuery::new("docs", "q")
                .with_similarity_top_k(0)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_answer_shape() {
        let answer = DocumentAnswer::new(
            "Within 30 days.",
            vec![SourceNode {
                node: NodeContent {
                    id: "1".into(),
                    text: "Refunds are accepted within 30 days.".into(),
                },
                score: 0.82,
            }],
        );

        let value = serde_json::to_value(&answer).unwrap();
        assert_eq!(value["response"]["response"], "Within 30 days.");
        assert_eq!(
            value["response"]["source_nodes"][0]["node"]["text"],
            "Refunds are accepted within 30 days."
        );
        assert!(value["response"]["source_nodes"][0]["score"].is_number());
    }
}
