pub mod args;
pub mod executor;
pub mod types;

pub use args::parse_tool_args;
pub use executor::{execute_tool_call, ToolError, ToolExecutor, ToolOutputSender};
pub use types::{ParamType, ParameterSpec, ToolCall, ToolOutput, ToolResult, ToolSchema};
