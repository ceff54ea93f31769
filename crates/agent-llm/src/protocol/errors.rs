//! Error types for protocol conversion.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid content format: {0}")]
    InvalidContent(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid tool call: {0}")]
    InvalidToolCall(String),

    #[error("Prompt blocked by backend: {0}")]
    Blocked(String),
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;
