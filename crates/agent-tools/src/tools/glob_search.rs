//! Find files by glob pattern, newest first.
//!
//! `*` stays within one path component, `**` spans directories, and hidden
//! entries only match when the pattern spells out the leading dot.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use agent_core::tools::ToolOutput;
use glob::{MatchOptions, Pattern};
use serde::Deserialize;
use walkdir::{DirEntry, WalkDir};

use super::{display_path, resolve_path};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GlobArgs {
    pub pattern: String,
    /// Base directory, defaults to the working directory.
    #[serde(default)]
    pub path: Option<String>,
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

pub async fn glob(args: &GlobArgs, working_dir: &Path) -> ToolOutput {
    let base = resolve_path(working_dir, args.path.as_deref().unwrap_or("."));
    if !base.is_dir() {
        return ToolOutput::failure(format!(
            "error: not a directory: {}",
            args.path.as_deref().unwrap_or(".")
        ));
    }

    let pattern = args.pattern.clone();
    let found = match tokio::task::spawn_blocking(move || search(&base, &pattern)).await {
        Ok(found) => found,
        Err(e) => return ToolOutput::failure(format!("error: glob search aborted: {e}")),
    };

    match found {
        Ok(paths) => {
            let lines: Vec<String> = paths
                .iter()
                .map(|path| display_path(working_dir, path))
                .collect();
            ToolOutput::ok(lines.join("\n"))
        }
        Err(message) => ToolOutput::failure(format!("error: {message}")),
    }
}

/// Matching files under `base`, sorted by mtime descending then path.
pub fn search(base: &Path, pattern: &str) -> Result<Vec<PathBuf>, String> {
    let compiled = Pattern::new(pattern)
        .map_err(|e| format!("invalid glob pattern '{}': {}", pattern, e))?;

    // Hidden directories are only worth descending into if the pattern names one.
    let wants_hidden = pattern.split('/').any(|part| part.starts_with('.'));

    let mut matches: Vec<(SystemTime, PathBuf)> = Vec::new();
    for entry in WalkDir::new(base)
        .follow_links(false)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| wants_hidden || !is_hidden(entry))
        .filter_map(Result::ok)
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = match entry.path().strip_prefix(base) {
            Ok(relative) => relative.to_string_lossy().replace('\\', "/"),
            Err(_) => continue,
        };

        if !compiled.matches_with(&relative, MATCH_OPTIONS) {
            continue;
        }

        let modified = entry
            .metadata()
            .ok()
            .and_then(|meta| meta.modified().ok())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        matches.push((modified, entry.into_path()));
    }

    matches.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    Ok(matches.into_iter().map(|(_, path)| path).collect())
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}
