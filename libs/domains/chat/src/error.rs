use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    /// The backend could not be reached or did not answer in time.
    #[error("Document querying API unavailable: {0}")]
    Unavailable(String),

    /// The backend answered with an error envelope.
    #[error("Document querying API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),

    /// The backend reported a failure after the stream had started.
    #[error("Stream failed: {0}")]
    Stream(String),

    #[error("A response is already being produced")]
    Busy,

    #[error("No response is being produced")]
    NoPendingTurn,

    #[error("Prompt must not be empty")]
    EmptyPrompt,

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type ChatResult<T> = Result<T, ChatError>;

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            ChatError::Config(err.to_string())
        } else if err.is_timeout() || err.is_connect() || err.is_request() {
            ChatError::Unavailable(err.to_string())
        } else if err.is_decode() {
            ChatError::InvalidResponse(err.to_string())
        } else {
            ChatError::Stream(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        ChatError::InvalidResponse(err.to_string())
    }
}
