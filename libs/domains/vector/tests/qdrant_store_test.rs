//! QdrantStore tests against a real Qdrant container.
//!
//! Run with `cargo test -p domain_vector -- --ignored` on a machine with Docker.

use domain_vector::{QdrantConfig, QdrantStore, VectorError, VectorStore};
use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointStruct, UpsertPointsBuilder, VectorParamsBuilder,
};
use serde_json::json;
use test_utils::{TestDataBuilder, TestQdrant, unreachable_url};

async fn seed_collection(url: &str, name: &str) {
    let client = Qdrant::from_url(url).build().unwrap();
    client
        .create_collection(
            CreateCollectionBuilder::new(name)
                .vectors_config(VectorParamsBuilder::new(4, Distance::Cosine)),
        )
        .await
        .unwrap();

    let node = json!({"text": "Refunds are accepted within 30 days."}).to_string();
    let points = vec![
        PointStruct::new(
            1_u64,
            vec![1.0, 0.0, 0.0, 0.0],
            [("text", "Shipping takes 5 days.".into())],
        ),
        PointStruct::new(2_u64, vec![0.0, 1.0, 0.0, 0.0], [("_node_content", node.into())]),
    ];
    client
        .upsert_points(UpsertPointsBuilder::new(name, points).wait(true))
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_store_against_qdrant() {
    let qdrant = TestQdrant::new().await;
    let name = TestDataBuilder::from_test_name("test_store_against_qdrant").name("collection", "docs");
    seed_collection(&qdrant.grpc_url, &name).await;

    let store = QdrantStore::new(QdrantConfig::new(qdrant.grpc_url.clone())).unwrap();

    store.health_check().await.unwrap();
    assert!(store.list_collections().await.unwrap().contains(&name));
    assert!(store.collection_exists(&name).await.unwrap());
    assert!(!store.collection_exists("absent").await.unwrap());

    let info = store.collection_info(&name).await.unwrap();
    assert_eq!(info.vector_size, Some(4));
    assert_eq!(info.distance.as_deref(), Some("Cosine"));
    assert_eq!(info.points_count, Some(2));

    let missing = store.collection_info("absent").await.unwrap_err();
    assert!(matches!(missing, VectorError::CollectionNotFound(n) if n == "absent"));

    let hits = store.search(&name, vec![0.0, 1.0, 0.0, 0.0], 1).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "2");
    assert_eq!(
        hits[0].text.as_deref(),
        Some("Refunds are accepted within 30 days.")
    );
}

#[tokio::test]
async fn test_unreachable_qdrant_is_unavailable() {
    let config = QdrantConfig::new(unreachable_url().await)
        .with_timeout(std::time::Duration::from_secs(2));
    let store = QdrantStore::new(config).unwrap();

    let err = store.list_collections().await.unwrap_err();
    assert!(
        matches!(err, VectorError::Unavailable(_) | VectorError::Qdrant(_)),
        "unexpected error: {err:?}"
    );
}
