use std::path::Path;

use agent_core::tools::ToolOutput;
use serde::Deserialize;
use tokio::fs;

use super::resolve_path;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EditArgs {
    pub path: String,
    pub old_string: String,
    pub new_string: String,
}

/// Replace the single occurrence of `old_string`. The file is untouched on failure.
pub async fn edit(args: &EditArgs, working_dir: &Path) -> ToolOutput {
    if args.old_string.is_empty() {
        return ToolOutput::failure("error: old_string must not be empty");
    }

    let path = resolve_path(working_dir, &args.path);
    let content = match fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(e) => {
            return ToolOutput::failure(format!("error: cannot read {}: {}", args.path, e));
        }
    };

    match content.matches(args.old_string.as_str()).count() {
        0 => ToolOutput::failure(format!("error: old_string not found in {}", args.path)),
        1 => {
            let updated = content.replacen(&args.old_string, &args.new_string, 1);
            match fs::write(&path, updated).await {
                Ok(()) => ToolOutput::ok("ok"),
                Err(e) => {
                    ToolOutput::failure(format!("error: cannot write {}: {}", args.path, e))
                }
            }
        }
        count => ToolOutput::failure(format!(
            "error: old_string is ambiguous, found {count} times in {}; add more context",
            args.path
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(old: &str, new: &str) -> EditArgs {
        EditArgs {
            path: "f.txt".to_string(),
            old_string: old.to_string(),
            new_string: new.to_string(),
        }
    }

    fn setup(content: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("f.txt"), content).unwrap();
        dir
    }

    fn contents(dir: &TempDir) -> String {
        std::fs::read_to_string(dir.path().join("f.txt")).unwrap()
    }

    #[tokio::test]
    async fn replaces_unique_occurrence() {
        let dir = setup("fn main() {\n    old();\n}\n");

        let output = edit(&args("old()", "new()"), dir.path()).await;

        assert!(output.success);
        assert_eq!(contents(&dir), "fn main() {\n    new();\n}\n");
    }

    #[tokio::test]
    async fn missing_text_leaves_file_unchanged() {
        let dir = setup("alpha beta");

        let output = edit(&args("gamma", "delta"), dir.path()).await;

        assert!(!output.success);
        assert!(output.text.contains("not found"));
        assert_eq!(contents(&dir), "alpha beta");
    }

    #[tokio::test]
    async fn ambiguous_text_reports_count_and_leaves_file_unchanged() {
        let dir = setup("x = 1\nx = 1\nx = 1\n");

        let output = edit(&args("x = 1", "x = 2"), dir.path()).await;

        assert!(!output.success);
        assert!(output.text.contains("ambiguous"));
        assert!(output.text.contains("3 times"));
        assert_eq!(contents(&dir), "x = 1\nx = 1\nx = 1\n");
    }

    #[tokio::test]
    async fn empty_old_string_is_rejected() {
        let dir = setup("abc");

        let output = edit(&args("", "z"), dir.path()).await;

        assert!(!output.success);
        assert_eq!(contents(&dir), "abc");
    }
}
