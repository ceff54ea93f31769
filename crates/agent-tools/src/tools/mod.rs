//! The six built-in tools.
//!
//! Tools form a closed set: [`BuiltinTool`] names one, its schema describes
//! the arguments, and [`BuiltinTool::parse`] turns coerced arguments into a
//! typed [`ToolInvocation`] that knows how to run itself.

pub mod bash;
pub mod edit_file;
pub mod glob_search;
pub mod grep_search;
pub mod read_file;
pub mod write_file;

use std::path::{Path, PathBuf};

use agent_core::tools::{ParamType, ToolError, ToolOutput, ToolOutputSender, ToolSchema};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

pub use bash::BashArgs;
pub use edit_file::EditArgs;
pub use glob_search::GlobArgs;
pub use grep_search::GrepArgs;
pub use read_file::ReadArgs;
pub use write_file::WriteArgs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinTool {
    Read,
    Write,
    Edit,
    Glob,
    Grep,
    Bash,
}

impl BuiltinTool {
    pub const ALL: [BuiltinTool; 6] = [
        BuiltinTool::Read,
        BuiltinTool::Write,
        BuiltinTool::Edit,
        BuiltinTool::Glob,
        BuiltinTool::Grep,
        BuiltinTool::Bash,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BuiltinTool::Read => "read",
            BuiltinTool::Write => "write",
            BuiltinTool::Edit => "edit",
            BuiltinTool::Glob => "glob",
            BuiltinTool::Grep => "grep",
            BuiltinTool::Bash => "bash",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    pub fn schema(&self) -> ToolSchema {
        match self {
            BuiltinTool::Read => ToolSchema::new("read", "Read file with line numbers")
                .required("path", ParamType::String, "File path to read")
                .optional("offset", ParamType::Integer, "Number of lines to skip")
                .optional("limit", ParamType::Integer, "Maximum number of lines to return"),
            BuiltinTool::Write => ToolSchema::new("write", "Write content to file")
                .required("path", ParamType::String, "File path to write")
                .required("content", ParamType::String, "Full file content"),
            BuiltinTool::Edit => ToolSchema::new(
                "edit",
                "Replace old_string with new_string in file (old_string must be unique)",
            )
            .required("path", ParamType::String, "File path to edit")
            .required("old_string", ParamType::String, "Exact text to replace")
            .required("new_string", ParamType::String, "Replacement text"),
            BuiltinTool::Glob => {
                ToolSchema::new("glob", "Find files by pattern, sorted by mtime")
                    .required("pattern", ParamType::String, "Glob pattern, e.g. **/*.rs")
                    .optional("path", ParamType::String, "Directory to search from")
            }
            BuiltinTool::Grep => ToolSchema::new("grep", "Search files for regex pattern")
                .required("pattern", ParamType::String, "Regular expression")
                .optional("path", ParamType::String, "File or directory to search"),
            BuiltinTool::Bash => ToolSchema::new("bash", "Run shell command")
                .required("command", ParamType::String, "Command passed to sh -c")
                .optional("timeout", ParamType::Integer, "Timeout in seconds (default 30)"),
        }
    }

    /// Build a typed invocation from arguments already coerced to the schema.
    pub fn parse(&self, args: Map<String, Value>) -> Result<ToolInvocation, ToolError> {
        Ok(match self {
            BuiltinTool::Read => ToolInvocation::Read(from_args(args)?),
            BuiltinTool::Write => ToolInvocation::Write(from_args(args)?),
            BuiltinTool::Edit => ToolInvocation::Edit(from_args(args)?),
            BuiltinTool::Glob => ToolInvocation::Glob(from_args(args)?),
            BuiltinTool::Grep => ToolInvocation::Grep(from_args(args)?),
            BuiltinTool::Bash => ToolInvocation::Bash(from_args(args)?),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToolInvocation {
    Read(ReadArgs),
    Write(WriteArgs),
    Edit(EditArgs),
    Glob(GlobArgs),
    Grep(GrepArgs),
    Bash(BashArgs),
}

impl ToolInvocation {
    /// Run the tool. Only `bash` produces output worth forwarding to `live`.
    pub async fn execute(self, working_dir: &Path, live: Option<&ToolOutputSender>) -> ToolOutput {
        match self {
            ToolInvocation::Read(args) => read_file::read(&args, working_dir).await,
            ToolInvocation::Write(args) => write_file::write(&args, working_dir).await,
            ToolInvocation::Edit(args) => edit_file::edit(&args, working_dir).await,
            ToolInvocation::Glob(args) => glob_search::glob(&args, working_dir).await,
            ToolInvocation::Grep(args) => grep_search::grep(&args, working_dir).await,
            ToolInvocation::Bash(args) => bash::bash(&args, working_dir, live).await,
        }
    }
}

fn from_args<T: DeserializeOwned>(args: Map<String, Value>) -> Result<T, ToolError> {
    serde_json::from_value(Value::Object(args))
        .map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

/// Relative paths resolve against the working directory; absolute ones are kept.
pub fn resolve_path(working_dir: &Path, raw: &str) -> PathBuf {
    let path = Path::new(raw);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        working_dir.join(path)
    }
}

/// Path shown to the model: relative to the working directory when possible.
pub(crate) fn display_path(working_dir: &Path, path: &Path) -> String {
    path.strip_prefix(working_dir)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn args(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn names_round_trip() {
        for tool in BuiltinTool::ALL {
            assert_eq!(BuiltinTool::from_name(tool.name()), Some(tool));
            assert_eq!(tool.schema().name, tool.name());
        }
        assert_eq!(BuiltinTool::from_name("teleport"), None);
    }

    #[test]
    fn parse_builds_typed_invocations() {
        let invocation = BuiltinTool::Read
            .parse(args(json!({"path": "a.txt", "limit": 3})))
            .unwrap();
        assert_eq!(
            invocation,
            ToolInvocation::Read(ReadArgs {
                path: "a.txt".to_string(),
                offset: None,
                limit: Some(3),
            })
        );

        let invocation = BuiltinTool::Bash
            .parse(args(json!({"command": "ls"})))
            .unwrap();
        assert!(matches!(invocation, ToolInvocation::Bash(BashArgs { timeout: None, .. })));
    }

    #[test]
    fn parse_rejects_negative_counts() {
        let err = BuiltinTool::Read
            .parse(args(json!({"path": "a.txt", "offset": -1})))
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[test]
    fn resolve_path_keeps_absolute_paths() {
        let cwd = Path::new("/work");
        assert_eq!(resolve_path(cwd, "a/b.txt"), PathBuf::from("/work/a/b.txt"));
        assert_eq!(resolve_path(cwd, "/etc/hosts"), PathBuf::from("/etc/hosts"));
        assert_eq!(display_path(cwd, Path::new("/work/a/b.txt")), "a/b.txt");
        assert_eq!(display_path(cwd, Path::new("/etc/hosts")), "/etc/hosts");
    }
}
