mod client;
mod config;

pub use client::OpenAiClient;
pub use config::OpenAiConfig;
