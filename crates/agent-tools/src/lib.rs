//! Built-in tools for file access, search, and shell commands.
//!
//! Tools are a closed set ([`BuiltinTool`]) registered by name in a
//! [`ToolRegistry`] and dispatched through [`BuiltinToolExecutor`].

mod executor;
pub mod registry;
pub mod tools;

pub use executor::{BuiltinToolExecutor, BuiltinToolExecutorBuilder};
pub use registry::{RegisteredTool, RegistryError, ToolRegistry};
pub use tools::{
    resolve_path, BashArgs, BuiltinTool, EditArgs, GlobArgs, GrepArgs, ReadArgs, ToolInvocation,
    WriteArgs,
};
