//! Error types for Parley operations

use std::time::Duration;

/// Result type for Parley operations
pub type Result<T> = std::result::Result<T, ParleyError>;

/// Error types for the Parley framework
#[derive(Debug, thiserror::Error)]
pub enum ParleyError {
    /// A chatbot failed to produce an answer
    #[error("Chatbot error: {0}")]
    Chatbot(String),

    /// No chatbot registered under the requested name
    #[error("Chatbot not found: {0}")]
    ChatbotNotFound(String),

    /// Model provider failure
    #[error("LLM error: {0}")]
    Llm(String),

    /// Tool invocation failure
    #[error("Tool error: {0}")]
    Tool(String),

    /// Chatbot state could not be cleared
    #[error("Reset error: {0}")]
    Reset(String),

    /// An answer took longer than the configured limit
    #[error("Timed out after {:.1}s", .0.as_secs_f64())]
    Timeout(Duration),

    /// Test suite definition is invalid or unreadable
    #[error("Test suite error: {0}")]
    Suite(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for ParleyError {
    fn from(s: String) -> Self {
        ParleyError::Other(s)
    }
}

impl From<&str> for ParleyError {
    fn from(s: &str) -> Self {
        ParleyError::Other(s.to_string())
    }
}

impl From<anyhow::Error> for ParleyError {
    fn from(err: anyhow::Error) -> Self {
        ParleyError::Other(err.to_string())
    }
}
