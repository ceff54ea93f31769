//! Append-only conversation history.
//!
//! The history is the only state handed to the model on every round, so it
//! guards the pairing rule the backend relies on: each tool call in a model
//! message is answered by exactly one tool result, in request order, before
//! anything else is appended.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::agent::{ModelMessage, Turn};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HistoryError {
    #[error("tool calls still awaiting results: {}", .0.join(", "))]
    UnansweredToolCalls(Vec<String>),

    #[error("tool result '{0}' does not answer any pending tool call")]
    UnexpectedToolResult(String),

    #[error("tool result '{got}' arrived out of order, expected '{expected}'")]
    OutOfOrderToolResult { expected: String, got: String },

    #[error("duplicate tool call id '{0}' in one model message")]
    DuplicateToolCallId(String),
}

/// A tool call that has been requested but not yet answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingToolCall {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct History {
    turns: Vec<Turn>,
    pending: Vec<PendingToolCall>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn, rejecting anything that would break call/result pairing.
    pub fn append(&mut self, turn: Turn) -> Result<(), HistoryError> {
        match &turn {
            Turn::User { .. } => self.ensure_no_pending()?,
            Turn::Model(message) => {
                self.ensure_no_pending()?;
                self.pending = Self::pending_from(message)?;
            }
            Turn::ToolResult(result) => {
                let expected = self
                    .pending
                    .first()
                    .ok_or_else(|| HistoryError::UnexpectedToolResult(result.tool_call_id.clone()))?;

                if expected.id != result.tool_call_id {
                    if self.pending.iter().any(|call| call.id == result.tool_call_id) {
                        return Err(HistoryError::OutOfOrderToolResult {
                            expected: expected.id.clone(),
                            got: result.tool_call_id.clone(),
                        });
                    }
                    return Err(HistoryError::UnexpectedToolResult(
                        result.tool_call_id.clone(),
                    ));
                }

                self.pending.remove(0);
            }
        }

        self.turns.push(turn);
        Ok(())
    }

    /// Read-only copy of every turn appended so far.
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.clone()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
        self.pending.clear();
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Calls from the latest model message that still need a result, in order.
    pub fn pending_tool_calls(&self) -> &[PendingToolCall] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    fn ensure_no_pending(&self) -> Result<(), HistoryError> {
        if self.pending.is_empty() {
            Ok(())
        } else {
            Err(HistoryError::UnansweredToolCalls(
                self.pending.iter().map(|call| call.id.clone()).collect(),
            ))
        }
    }

    fn pending_from(message: &ModelMessage) -> Result<Vec<PendingToolCall>, HistoryError> {
        let mut pending: Vec<PendingToolCall> = Vec::with_capacity(message.tool_calls.len());
        for call in &message.tool_calls {
            if pending.iter().any(|existing| existing.id == call.id) {
                return Err(HistoryError::DuplicateToolCallId(call.id.clone()));
            }
            pending.push(PendingToolCall {
                id: call.id.clone(),
                name: call.name.clone(),
            });
        }
        Ok(pending)
    }
}
