use async_trait::async_trait;

use crate::error::CompletionResult;
use crate::models::{Completion, CompletionRequest, CompletionStream};

/// A chat-completion backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Model used when a request does not name one.
    fn default_model(&self) -> String;

    /// Models offered to front-ends; the default model comes first.
    fn available_models(&self) -> Vec<String>;

    /// Request the whole completion at once.
    async fn complete(&self, request: &CompletionRequest) -> CompletionResult<Completion>;

    /// Open a streamed completion. Errors raised before the first chunk are
    /// returned here; later ones arrive as stream items.
    async fn stream(&self, request: &CompletionRequest) -> CompletionResult<CompletionStream>;

    /// Whether the configured credential is accepted. Never fails.
    async fn check_key(&self) -> bool;
}

#[async_trait]
impl<T: CompletionProvider + ?Sized> CompletionProvider for std::sync::Arc<T> {
    fn default_model(&self) -> String {
        (**self).default_model()
    }

    fn available_models(&self) -> Vec<String> {
        (**self).available_models()
    }

    async fn complete(&self, request: &CompletionRequest) -> CompletionResult<Completion> {
        (**self).complete(request).await
    }

    async fn stream(&self, request: &CompletionRequest) -> CompletionResult<CompletionStream> {
        (**self).stream(request).await
    }

    async fn check_key(&self) -> bool {
        (**self).check_key().await
    }
}
