//! Shared test utilities for domain and app testing
//!
//! This crate provides reusable test infrastructure:
//! - `TestServer`: serves an axum `Router` on an ephemeral loopback port
//! - `FakeOpenAi`: an OpenAI-compatible upstream (chat completions, models,
//!   embeddings) with scripted replies
//! - `TestQdrant`: a Qdrant container with automatic cleanup (feature: "qdrant")
//! - `TestDataBuilder`: deterministic test names (always available)
//!
//! # Usage
//!
//! ## Fake model provider
//!
//! ```rust,no_run
//! use test_utils::{FakeOpenAi, TEST_API_KEY};
//!
//! # async fn example() {
//! let upstream = FakeOpenAi::new()
//!     .with_chunks(["Refunds are ", "accepted."])
//!     .spawn()
//!     .await;
//!
//! // Point the client under test at upstream.base_url() with TEST_API_KEY.
//! # }
//! ```
//!
//! ## Qdrant
//!
//! Add `features = ["qdrant"]` to your dev-dependencies:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { workspace = true, features = ["qdrant"] }
//! ```

mod openai;
mod server;

#[cfg(feature = "qdrant")]
mod qdrant;

pub use openai::{FakeOpenAi, FakeOpenAiServer, TEST_API_KEY};
pub use server::{TestServer, unreachable_url};

#[cfg(feature = "qdrant")]
pub use qdrant::TestQdrant;

/// Builder for test data with deterministic names
///
/// Tests sharing one upstream (e.g. a Qdrant container) use it to avoid
/// collection name clashes.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Create from test name (generates seed from test name hash)
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_collection_info");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Generate a unique name for testing
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("my_test");
    /// let name = builder.name("collection", "docs");
    /// assert!(name.starts_with("test-collection-"));
    /// ```
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, suffix)
    }
}
