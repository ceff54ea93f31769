use std::path::Path;
use std::sync::OnceLock;

use colored::Colorize;
use crossterm::terminal;
use regex::{Captures, Regex};
use serde_json::Value;

use agent_core::AgentEvent;

const MAX_SEPARATOR_WIDTH: usize = 80;
const ARG_PREVIEW_CHARS: usize = 50;
const RESULT_PREVIEW_CHARS: usize = 60;

pub fn banner(model: &str, working_dir: &Path) -> String {
    format!(
        "{} | {} | {}",
        "nanocode".bold(),
        format!("{model} (Gemini)").dimmed(),
        working_dir.display().to_string().dimmed()
    )
}

pub fn separator() -> String {
    let columns = terminal::size().ok().map(|(columns, _)| usize::from(columns));
    "─".repeat(separator_width(columns)).dimmed().to_string()
}

/// Terminal width capped at 80; 80 when the width is unknown.
fn separator_width(columns: Option<usize>) -> usize {
    columns
        .filter(|columns| *columns > 0)
        .map_or(MAX_SEPARATOR_WIDTH, |columns| columns.min(MAX_SEPARATOR_WIDTH))
}

/// Render `**bold**` spans as terminal bold. Everything else passes through.
pub fn render_markdown(text: &str) -> String {
    static BOLD: OnceLock<Option<Regex>> = OnceLock::new();
    match BOLD.get_or_init(|| Regex::new(r"\*\*(.+?)\*\*").ok()) {
        Some(bold) => bold
            .replace_all(text, |caps: &Captures| caps[1].bold().to_string())
            .into_owned(),
        None => text.to_string(),
    }
}

/// `Name(first argument)` as shown when a tool starts.
pub fn tool_preview(tool_name: &str, arguments: &Value) -> String {
    let first_arg = arguments
        .as_object()
        .and_then(|args| args.values().next())
        .map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .unwrap_or_default();

    format!(
        "{}({})",
        capitalize(tool_name),
        truncate_chars(&first_arg, ARG_PREVIEW_CHARS)
    )
}

/// First line of a tool result plus a count of the lines not shown.
pub fn result_preview(output: &str) -> String {
    let mut lines = output.lines();
    let first = lines.next().unwrap_or_default();
    let rest = lines.count();

    let mut preview = truncate_chars(first, RESULT_PREVIEW_CHARS);
    if rest > 0 {
        preview.push_str(&format!(" … +{rest} lines"));
    } else if first.chars().count() > RESULT_PREVIEW_CHARS {
        preview.push_str("...");
    }
    preview
}

/// Text to print for a loop event, if any.
///
/// Errors are left to the caller, which reports the turn's outcome once.
pub fn render_event(event: &AgentEvent) -> Option<String> {
    match event {
        AgentEvent::ModelText { content } => {
            Some(format!("\n{} {}", "⏺".cyan(), render_markdown(content)))
        }
        AgentEvent::ToolStart {
            tool_name,
            arguments,
            ..
        } => Some(format!(
            "\n{} {}",
            "⏺".green(),
            tool_preview(tool_name, arguments)
        )),
        AgentEvent::ToolOutput { line, .. } => {
            Some(format!("  {}", format!("│ {line}").dimmed()))
        }
        AgentEvent::ToolComplete { result, .. } => {
            let preview = result_preview(&result.output);
            let preview = if result.success {
                preview.dimmed()
            } else {
                preview.red()
            };
            Some(format!("  {} {}", "⎿".dimmed(), preview))
        }
        AgentEvent::Complete { .. } | AgentEvent::Error { .. } => None,
    }
}

pub fn error_line(message: &str) -> String {
    format!("⏺ Error: {message}").red().to_string()
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
