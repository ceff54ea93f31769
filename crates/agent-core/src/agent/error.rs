use thiserror::Error;

use crate::history::HistoryError;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Round limit exceeded: no final answer after {0} rounds")]
    RoundLimitExceeded(usize),

    #[error("History error: {0}")]
    History(#[from] HistoryError),

    #[error("Cancelled")]
    Cancelled,
}
