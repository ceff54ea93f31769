use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::tools::{ToolCall, ToolResult, ToolSchema};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("{0}")]
    Execution(String),
}

pub type Result<T> = std::result::Result<T, ToolError>;

/// Receives output lines, without their line terminator, while a tool runs.
pub type ToolOutputSender = mpsc::UnboundedSender<String>;

/// Dispatches tool calls against a working directory.
///
/// A failing tool (missing file, non-zero exit) is still `Ok` with
/// `success == false`; `Err` is reserved for calls that never reached a tool.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute(&self, call: &ToolCall, working_dir: &Path) -> Result<ToolResult>;

    /// Like [`execute`](Self::execute), also forwarding output lines to `live`
    /// as the tool produces them. The final result still carries the full output.
    async fn execute_live(
        &self,
        call: &ToolCall,
        working_dir: &Path,
        live: &ToolOutputSender,
    ) -> Result<ToolResult> {
        let _ = live;
        self.execute(call, working_dir).await
    }

    fn list_tools(&self) -> Vec<ToolSchema>;
}

/// Run a call and always produce a result the model can read.
pub async fn execute_tool_call(
    call: &ToolCall,
    tools: &dyn ToolExecutor,
    working_dir: &Path,
    live: Option<&ToolOutputSender>,
) -> ToolResult {
    let outcome = match live {
        Some(live) => tools.execute_live(call, working_dir, live).await,
        None => tools.execute(call, working_dir).await,
    };

    match outcome {
        Ok(result) => result,
        Err(error) => {
            log::debug!("Tool call {} ({}) rejected: {}", call.id, call.name, error);
            ToolResult::failure(&call.id, &call.name, format!("error: {error}"))
        }
    }
}
