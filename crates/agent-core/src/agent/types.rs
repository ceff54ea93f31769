use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::history::History;
use crate::tools::{ToolCall, ToolResult};

/// One atomic unit of conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Turn {
    User { content: String },
    Model(ModelMessage),
    ToolResult(ToolResult),
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Turn::User {
            content: content.into(),
        }
    }

    pub fn model(text: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Turn::Model(ModelMessage { text, tool_calls })
    }

    pub fn tool_result(result: ToolResult) -> Self {
        Turn::ToolResult(result)
    }

    pub fn is_user(&self) -> bool {
        matches!(self, Turn::User { .. })
    }
}

/// A backend response: final text, requested tool calls, or both.
///
/// Tool call order is significant; later calls may depend on the side
/// effects of earlier ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ModelMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
}

impl ModelMessage {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            text: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    pub fn with_tool_calls(text: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self { text, tool_calls }
    }

    /// Text with surrounding whitespace removed, `None` when blank.
    pub fn visible_text(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    pub fn is_terminal(&self) -> bool {
        self.tool_calls.is_empty()
    }

    /// Neither text nor tool calls. Backends must never produce this.
    pub fn is_empty(&self) -> bool {
        self.tool_calls.is_empty() && self.visible_text().is_none()
    }
}

/// A single interactive session: its history and the directory its tools act on.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub history: History,
    pub working_dir: PathBuf,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), working_dir)
    }

    pub fn with_id(id: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            history: History::new(),
            working_dir: working_dir.into(),
            created_at: Utc::now(),
        }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Drop every turn. The working directory is kept.
    pub fn clear(&mut self) {
        self.history.clear();
    }
}
