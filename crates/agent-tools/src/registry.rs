use agent_core::tools::{ToolError, ToolSchema};
use dashmap::{mapref::entry::Entry, DashMap};
use thiserror::Error;

use crate::tools::BuiltinTool;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("tool with name '{0}' already registered")]
    DuplicateTool(String),

    #[error("invalid tool: {0}")]
    InvalidTool(String),
}

/// A registry entry: the advertised schema and the tool that serves it.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredTool {
    pub schema: ToolSchema,
    pub tool: BuiltinTool,
}

/// Name-keyed tool table, filled once at startup.
pub struct ToolRegistry {
    tools: DashMap<String, RegisteredTool>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: DashMap::new(),
        }
    }

    /// Registry holding all six built-in tools.
    pub fn with_builtin_tools() -> Result<Self, RegistryError> {
        let registry = Self::new();
        for tool in BuiltinTool::ALL {
            registry.register(tool.name(), tool.schema(), tool)?;
        }
        Ok(registry)
    }

    pub fn register(
        &self,
        name: &str,
        schema: ToolSchema,
        tool: BuiltinTool,
    ) -> Result<(), RegistryError> {
        let name = name.trim();

        if name.is_empty() {
            return Err(RegistryError::InvalidTool(
                "tool name cannot be empty".to_string(),
            ));
        }

        if schema.name != name {
            return Err(RegistryError::InvalidTool(format!(
                "schema name '{}' does not match registered name '{}'",
                schema.name, name
            )));
        }

        match self.tools.entry(name.to_string()) {
            Entry::Occupied(_) => Err(RegistryError::DuplicateTool(name.to_string())),
            Entry::Vacant(entry) => {
                log::debug!("Registered tool '{}'", name);
                entry.insert(RegisteredTool { schema, tool });
                Ok(())
            }
        }
    }

    pub fn resolve(&self, name: &str) -> Result<RegisteredTool, ToolError> {
        self.tools
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Schemas of every registered tool, sorted by name.
    pub fn list_tools(&self) -> Vec<ToolSchema> {
        let mut tools: Vec<ToolSchema> = self
            .tools
            .iter()
            .map(|entry| entry.value().schema.clone())
            .collect();
        tools.sort_by(|left, right| left.name.cmp(&right.name));
        tools
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
