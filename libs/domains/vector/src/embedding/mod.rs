mod openai;
mod provider;

pub use openai::{OpenAIEmbeddingConfig, OpenAIEmbeddings};
pub use provider::EmbeddingProvider;

#[cfg(test)]
pub use provider::MockEmbeddingProvider;
