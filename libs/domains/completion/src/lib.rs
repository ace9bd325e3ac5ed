//! Completion Domain Library
//!
//! Relays prompts to an OpenAI-compatible chat-completion API, either as one
//! batched answer or as a stream of text fragments.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────┐
//! │  CompletionService │  ← validation, mode dispatch, metrics
//! └─────────┬──────────┘
//!           │
//! ┌─────────▼──────────┐
//! │ CompletionProvider │
//! │      (trait)       │
//! └─────────┬──────────┘
//!           │
//! ┌─────────▼──────────┐     ┌────────────┐
//! │    OpenAiClient    │ ──▶ │ SseDecoder │
//! └────────────────────┘     └────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use core_config::FromEnv;
//! use domain_completion::{
//!     CompletionOutput, CompletionRequest, CompletionService, OpenAiClient, OpenAiConfig,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OpenAiClient::new(OpenAiConfig::from_env()?)?;
//! let service = CompletionService::new(client);
//!
//! let request = CompletionRequest::new("What is the refund policy?");
//! if let CompletionOutput::Batched(completion) = service.complete(request).await? {
//!     println!("{}", completion.message.content);
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod openai;
pub mod provider;
pub mod service;
pub mod sse;

pub use error::{CompletionError, CompletionResult};
pub use handlers::CompletionApiDoc;
pub use models::{
    AvailableLlms, Completion, CompletionChunk, CompletionEvent, CompletionMode,
    CompletionOutput, CompletionRequest, CompletionStream, LlmInfo, Message, Role, Usage,
};
pub use openai::{OpenAiClient, OpenAiConfig};
pub use provider::CompletionProvider;
pub use service::CompletionService;
pub use sse::{DONE_MARKER, SseDecoder, SseFrame};
