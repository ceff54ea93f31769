use agent_core::tools::ToolSchema;
use agent_core::{AgentError, ModelMessage, Turn};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LLMError {
    /// Network failure or rejected credentials.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered, but not with something usable.
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Protocol conversion error: {0}")]
    Protocol(#[from] crate::protocol::ProtocolError),
}

impl From<reqwest::Error> for LLMError {
    fn from(error: reqwest::Error) -> Self {
        LLMError::Transport(error.to_string())
    }
}

impl From<LLMError> for AgentError {
    fn from(error: LLMError) -> Self {
        match error {
            LLMError::Transport(message) => AgentError::Transport(message),
            LLMError::Backend(message) => AgentError::Backend(message),
            LLMError::Protocol(error) => AgentError::Backend(error.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, LLMError>;

#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// One request/response exchange over the full history.
    ///
    /// Implementations are stateless between calls and never retry.
    async fn chat(
        &self,
        system_prompt: &str,
        history: &[Turn],
        tools: &[ToolSchema],
    ) -> Result<ModelMessage>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ProtocolError;

    #[test]
    fn llm_errors_map_to_agent_errors() {
        assert!(matches!(
            AgentError::from(LLMError::Transport("refused".to_string())),
            AgentError::Transport(message) if message == "refused"
        ));
        assert!(matches!(
            AgentError::from(LLMError::Backend("HTTP 500".to_string())),
            AgentError::Backend(_)
        ));
        assert!(matches!(
            AgentError::from(LLMError::Protocol(ProtocolError::MissingField(
                "candidates".to_string()
            ))),
            AgentError::Backend(message) if message.contains("candidates")
        ));
    }
}
