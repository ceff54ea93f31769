use std::path::Path;

use agent_core::tools::{
    parse_tool_args, ToolCall, ToolError, ToolExecutor, ToolOutputSender, ToolResult, ToolSchema,
};
use async_trait::async_trait;

use crate::registry::{RegistryError, ToolRegistry};
use crate::tools::BuiltinTool;

/// Executes model tool calls against the built-in tools in a [`ToolRegistry`].
pub struct BuiltinToolExecutor {
    registry: ToolRegistry,
}

impl BuiltinToolExecutor {
    /// Creates a new executor with all built-in tools registered
    pub fn new() -> Result<Self, RegistryError> {
        Ok(Self {
            registry: ToolRegistry::with_builtin_tools()?,
        })
    }

    /// Creates a new executor from an existing registry
    pub fn with_registry(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    /// Returns a reference to the internal registry
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    async fn dispatch(
        &self,
        call: &ToolCall,
        working_dir: &Path,
        live: Option<&ToolOutputSender>,
    ) -> Result<ToolResult, ToolError> {
        let entry = self.registry.resolve(&call.name)?;
        let args = parse_tool_args(&call.arguments)?;
        let args = entry.schema.coerce_args(args)?;
        let invocation = entry.tool.parse(args)?;

        let output = invocation.execute(working_dir, live).await;
        if !output.success {
            log::debug!("Tool {} ({}) failed: {}", call.name, call.id, output.text);
        }

        Ok(ToolResult::for_call(call, output))
    }
}

#[async_trait]
impl ToolExecutor for BuiltinToolExecutor {
    async fn execute(&self, call: &ToolCall, working_dir: &Path) -> Result<ToolResult, ToolError> {
        self.dispatch(call, working_dir, None).await
    }

    async fn execute_live(
        &self,
        call: &ToolCall,
        working_dir: &Path,
        live: &ToolOutputSender,
    ) -> Result<ToolResult, ToolError> {
        self.dispatch(call, working_dir, Some(live)).await
    }

    fn list_tools(&self) -> Vec<ToolSchema> {
        self.registry.list_tools()
    }
}

/// Builder for an executor exposing a subset of the built-in tools
pub struct BuiltinToolExecutorBuilder {
    registry: ToolRegistry,
}

impl BuiltinToolExecutorBuilder {
    /// Creates a new builder with no tools registered
    pub fn new() -> Self {
        Self {
            registry: ToolRegistry::new(),
        }
    }

    /// Registers one built-in tool under its own name
    pub fn with_tool(self, tool: BuiltinTool) -> Result<Self, RegistryError> {
        self.registry.register(tool.name(), tool.schema(), tool)?;
        Ok(self)
    }

    pub fn build(self) -> BuiltinToolExecutor {
        BuiltinToolExecutor {
            registry: self.registry,
        }
    }
}

impl Default for BuiltinToolExecutorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn executor() -> BuiltinToolExecutor {
        BuiltinToolExecutor::new().unwrap()
    }

    #[tokio::test]
    async fn executes_write_then_read() {
        let dir = TempDir::new().unwrap();
        let tools = executor();

        let write = ToolCall::new(
            "call_1",
            "write",
            json!({"path": "notes.txt", "content": "hello"}),
        );
        let result = tools.execute(&write, dir.path()).await.unwrap();
        assert!(result.success);
        assert_eq!(result.tool_call_id, "call_1");
        assert_eq!(
            std::fs::read_to_string(dir.path().join("notes.txt")).unwrap(),
            "hello"
        );

        let read = ToolCall::new("call_2", "read", json!({"path": "notes.txt"}));
        let result = tools.execute(&read, dir.path()).await.unwrap();
        assert_eq!(result.output, "   1| hello");
    }

    #[tokio::test]
    async fn accepts_json_string_arguments_and_coerces() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), "1\n2\n3\n").unwrap();
        let tools = executor();

        let call = ToolCall::new(
            "call_1",
            "read",
            json!(r#"{"path": "a.txt", "offset": "2", "ignored": true}"#),
        );
        let result = tools.execute(&call, dir.path()).await.unwrap();

        assert!(result.success);
        assert_eq!(result.output, "   3| 3\n");
    }

    #[tokio::test]
    async fn unknown_tool_is_an_error() {
        let dir = TempDir::new().unwrap();

        let call = ToolCall::new("call_1", "teleport", json!({}));
        let err = executor().execute(&call, dir.path()).await.unwrap_err();

        assert_eq!(err, ToolError::UnknownTool("teleport".to_string()));
    }

    #[tokio::test]
    async fn missing_required_argument_is_an_error() {
        let dir = TempDir::new().unwrap();

        let call = ToolCall::new("call_1", "write", json!({"path": "x.txt"}));
        let err = executor().execute(&call, dir.path()).await.unwrap_err();

        assert_eq!(
            err,
            ToolError::InvalidArguments("missing required parameter 'content'".to_string())
        );
        assert!(!dir.path().join("x.txt").exists());
    }

    #[tokio::test]
    async fn non_object_arguments_are_an_error() {
        let dir = TempDir::new().unwrap();

        let call = ToolCall::new("call_1", "bash", json!(42));
        let err = executor().execute(&call, dir.path()).await.unwrap_err();

        assert!(matches!(err, ToolError::InvalidArguments(message) if message.contains("must be object")));
    }

    #[tokio::test]
    async fn tool_failures_are_results_not_errors() {
        let dir = TempDir::new().unwrap();

        let call = ToolCall::new("call_1", "bash", json!({"command": "exit 2"}));
        let result = executor().execute(&call, dir.path()).await.unwrap();

        assert!(!result.success);
        assert_eq!(result.output, "(exit code 2)");
    }

    #[tokio::test]
    async fn live_execution_forwards_bash_lines() {
        let dir = TempDir::new().unwrap();
        let (live_tx, mut live_rx) = tokio::sync::mpsc::unbounded_channel();

        let call = ToolCall::new("call_1", "bash", json!({"command": "echo one; echo two"}));
        let result = executor()
            .execute_live(&call, dir.path(), &live_tx)
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.output, "one\ntwo\n");
        assert_eq!(live_rx.try_recv().unwrap(), "one");
        assert_eq!(live_rx.try_recv().unwrap(), "two");
        assert!(live_rx.try_recv().is_err());
    }

    #[test]
    fn builder_registers_subset() {
        let tools = BuiltinToolExecutorBuilder::new()
            .with_tool(BuiltinTool::Read)
            .unwrap()
            .with_tool(BuiltinTool::Glob)
            .unwrap()
            .build();

        let names: Vec<String> = tools.list_tools().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["glob", "read"]);
    }

    #[test]
    fn builder_rejects_duplicates() {
        let result = BuiltinToolExecutorBuilder::new()
            .with_tool(BuiltinTool::Bash)
            .unwrap()
            .with_tool(BuiltinTool::Bash);

        assert!(matches!(result, Err(RegistryError::DuplicateTool(_))));
    }
}
