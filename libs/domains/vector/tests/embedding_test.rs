//! OpenAI embedding client tests against the fake upstream.

use domain_vector::{EmbeddingProvider, OpenAIEmbeddingConfig, OpenAIEmbeddings, VectorError};
use test_utils::{FakeOpenAi, TEST_API_KEY, unreachable_url};

fn provider(base_url: String, api_key: &str) -> OpenAIEmbeddings {
    let config = OpenAIEmbeddingConfig::new(api_key).with_base_url(base_url);
    OpenAIEmbeddings::new(config).unwrap()
}

#[tokio::test]
async fn test_embed_returns_vector_of_configured_dimension() {
    let upstream = FakeOpenAi::new().with_embedding_dimension(16).spawn().await;
    let provider = provider(upstream.base_url(), TEST_API_KEY);

    let embedding = provider.embed("What is the refund policy?").await.unwrap();

    assert_eq!(embedding.dimension, 16);
    assert_eq!(embedding.values.len(), 16);
}

#[tokio::test]
async fn test_embed_batch_keeps_input_order() {
    let upstream = FakeOpenAi::new().spawn().await;
    let provider = provider(upstream.base_url(), TEST_API_KEY);

    let texts = vec!["a".to_string(), "abc".to_string()];
    let batch = provider.embed_batch(&texts).await.unwrap();
    let first = provider.embed("a").await.unwrap();
    let second = provider.embed("abc").await.unwrap();

    assert_eq!(batch.len(), 2);
    assert_eq!(batch[0].values, first.values);
    assert_eq!(batch[1].values, second.values);
}

#[tokio::test]
async fn test_empty_batch_skips_upstream() {
    let provider = provider(unreachable_url().await, TEST_API_KEY);
    assert!(provider.embed_batch(&[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_rejected_key_is_credential_error() {
    let upstream = FakeOpenAi::new().spawn().await;
    let provider = provider(upstream.base_url(), "sk-wrong");

    let err = provider.embed("hello").await.unwrap_err();
    assert!(matches!(err, VectorError::InvalidCredential(_)));
}

#[tokio::test]
async fn test_unreachable_upstream_is_unavailable() {
    let provider = provider(unreachable_url().await, TEST_API_KEY);

    let err = provider.embed("hello").await.unwrap_err();
    assert!(matches!(err, VectorError::Unavailable(_)));
}
