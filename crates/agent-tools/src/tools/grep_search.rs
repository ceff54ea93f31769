use std::path::{Path, PathBuf};

use agent_core::tools::ToolOutput;
use regex::Regex;
use serde::Deserialize;
use walkdir::WalkDir;

use super::{display_path, resolve_path};

pub const MAX_MATCHES: usize = 50;

/// Bytes inspected for a NUL when deciding whether a file is binary.
const BINARY_SNIFF_LEN: usize = 8000;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GrepArgs {
    pub pattern: String,
    #[serde(default)]
    pub path: Option<String>,
}

pub async fn grep(args: &GrepArgs, working_dir: &Path) -> ToolOutput {
    let regex = match Regex::new(&args.pattern) {
        Ok(regex) => regex,
        Err(e) => return ToolOutput::failure(format!("error: invalid regex: {e}")),
    };

    let target = resolve_path(working_dir, args.path.as_deref().unwrap_or("."));
    if !target.exists() {
        return ToolOutput::failure(format!(
            "error: path not found: {}",
            args.path.as_deref().unwrap_or(".")
        ));
    }

    let cwd = working_dir.to_path_buf();
    let searched = tokio::task::spawn_blocking(move || search(&regex, &target, &cwd)).await;

    match searched {
        Ok(hits) if hits.is_empty() => ToolOutput::ok("No matches found"),
        Ok(mut hits) => {
            let truncated = hits.len() > MAX_MATCHES;
            hits.truncate(MAX_MATCHES);
            let mut text = hits.join("\n");
            if truncated {
                text.push_str(&format!("\n... (truncated at {MAX_MATCHES} matches)"));
            }
            ToolOutput::ok(text)
        }
        Err(e) => ToolOutput::failure(format!("error: grep aborted: {e}")),
    }
}

/// Collect up to `MAX_MATCHES + 1` hits so the caller can tell whether it truncated.
fn search(regex: &Regex, target: &Path, working_dir: &Path) -> Vec<String> {
    let files: Vec<PathBuf> = if target.is_file() {
        vec![target.to_path_buf()]
    } else {
        WalkDir::new(target)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0 || !entry.file_name().to_string_lossy().starts_with('.')
            })
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .collect()
    };

    let mut hits = Vec::new();
    for file in files {
        let Some(content) = read_text(&file) else {
            continue;
        };

        let shown = display_path(working_dir, &file);
        for (index, line) in content.lines().enumerate() {
            if regex.is_match(line) {
                hits.push(format!("{}:{}:{}", shown, index + 1, line));
                if hits.len() > MAX_MATCHES {
                    return hits;
                }
            }
        }
    }
    hits
}

/// File content as text, or `None` for unreadable, binary, or non-UTF-8 files.
fn read_text(path: &Path) -> Option<String> {
    let bytes = std::fs::read(path).ok()?;
    if bytes.iter().take(BINARY_SNIFF_LEN).any(|byte| *byte == 0) {
        return None;
    }
    String::from_utf8(bytes).ok()
}
