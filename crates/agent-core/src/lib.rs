pub mod agent;
pub mod history;
pub mod tools;

pub use agent::events::AgentEvent;
pub use agent::types::{ModelMessage, Session, Turn};
pub use agent::AgentError;
pub use history::{History, HistoryError, PendingToolCall};
pub use tools::{
    execute_tool_call, parse_tool_args, ParamType, ParameterSpec, ToolCall, ToolError,
    ToolExecutor, ToolOutput, ToolOutputSender, ToolResult, ToolSchema,
};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
