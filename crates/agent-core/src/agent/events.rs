use crate::tools::ToolResult;
use serde::{Deserialize, Serialize};

/// Progress notifications emitted by the agent loop while a turn runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    /// Text the model produced in this round, with or without tool calls.
    ModelText {
        content: String,
    },

    ToolStart {
        tool_call_id: String,
        tool_name: String,
        arguments: serde_json::Value,
    },

    /// One line printed by a running tool, before its result is known.
    ToolOutput {
        tool_call_id: String,
        line: String,
    },

    ToolComplete {
        tool_call_id: String,
        result: ToolResult,
    },

    Complete {
        rounds: usize,
    },

    Error {
        message: String,
    },
}
