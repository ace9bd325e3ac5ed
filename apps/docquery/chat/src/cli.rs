use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use domain_chat::{ChatConfig, DocumentQueryingUrls};
use domain_completion::CompletionMode;
use domain_querying::DEFAULT_SIMILARITY_TOP_K;

#[derive(Parser, Debug)]
#[command(name = "docquery-chat", version)]
#[command(about = "Chat with the document querying API from a terminal")]
pub struct Cli {
    /// Backend base URL; overrides DOCUMENT_QUERYING_API_URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// How answers come back from the completion relay
    #[arg(short, long, value_enum, default_value_t = Mode::Streamed, global = true)]
    pub mode: Mode,

    /// Request deadline in seconds; overrides DOCUMENT_QUERYING_TIMEOUT_SECS
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Log at info level instead of warn
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Interactive chat session (the default)
    Chat,

    /// Backend liveness and OpenAI key validity
    Status,

    /// Collections in the vector database
    Collections,

    /// Models offered for document querying
    Models,

    /// Ask a single question and exit
    Ask { question: String },

    /// Answer a question from one collection's documents
    Query {
        collection: String,
        question: String,

        /// Model to answer with; the backend default when omitted
        #[arg(long)]
        model: Option<String>,

        /// Number of chunks retrieved as context
        #[arg(short = 'k', long, default_value_t = DEFAULT_SIMILARITY_TOP_K)]
        top_k: u64,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Batched,
    Streamed,
}

impl From<Mode> for CompletionMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Batched => CompletionMode::Batched,
            Mode::Streamed => CompletionMode::Streamed,
        }
    }
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Chat)
    }

    /// Layer the command-line overrides on top of the environment config.
    pub fn apply(&self, mut config: ChatConfig) -> ChatConfig {
        if let Some(url) = &self.api_url {
            config.urls = DocumentQueryingUrls::new(url.clone());
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config
    }

    pub fn log_filter(&self) -> &'static str {
        if self.verbose { "info" } else { "warn" }
    }
}
