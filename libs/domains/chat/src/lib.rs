//! Chat Domain Library
//!
//! Front-end side of the document-querying service: a [`QueryingClient`] for
//! the backend's HTTP API and a [`ChatSession`] that keeps one conversation's
//! transcript.
//!
//! ```rust,no_run
//! use core_config::FromEnv;
//! use domain_chat::{ChatConfig, ChatSession, QueryingClient};
//! use domain_completion::CompletionMode;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ChatConfig::from_env()?;
//! let client = QueryingClient::new(&config)?;
//! let mut session = ChatSession::new(config.greeting.clone());
//!
//! let answer = session
//!     .ask(&client, "What is the refund policy?", CompletionMode::Streamed, |text| {
//!         print!("{text}");
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod session;

pub use client::{Answer, QueryAnswer, QueryReference, QueryingClient, TextStream};
pub use config::{ChatConfig, DocumentQueryingUrls};
pub use error::{ChatError, ChatResult};
pub use session::{ChatSession, SessionState};
