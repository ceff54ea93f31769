use std::path::Path;

use agent_core::tools::ToolOutput;
use serde::Deserialize;
use tokio::fs;

use super::resolve_path;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReadArgs {
    pub path: String,
    /// Lines to skip before the first returned line.
    #[serde(default)]
    pub offset: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Read a file and prefix every line with its 1-based number.
pub async fn read(args: &ReadArgs, working_dir: &Path) -> ToolOutput {
    let path = resolve_path(working_dir, &args.path);

    let content = match fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(e) => {
            return ToolOutput::failure(format!("error: cannot read {}: {}", args.path, e));
        }
    };

    let offset = args.offset.unwrap_or(0);
    let limit = args.limit.unwrap_or(usize::MAX);

    let numbered = content
        .split_inclusive('\n')
        .enumerate()
        .skip(offset)
        .take(limit)
        .map(|(index, line)| format!("{:>4}| {}", index + 1, line))
        .collect::<String>();

    ToolOutput::ok(numbered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(path: &str, offset: Option<usize>, limit: Option<usize>) -> ReadArgs {
        ReadArgs {
            path: path.to_string(),
            offset,
            limit,
        }
    }

    #[tokio::test]
    async fn numbers_every_line() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), "one\ntwo\nthree").unwrap();

        let output = read(&args("a.txt", None, None), dir.path()).await;

        assert!(output.success);
        assert_eq!(output.text, "   1| one\n   2| two\n   3| three");
    }

    #[tokio::test]
    async fn honours_offset_and_limit() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), "1\n2\n3\n4\n5\n").unwrap();

        let output = read(&args("a.txt", Some(1), Some(2)), dir.path()).await;

        assert_eq!(output.text, "   2| 2\n   3| 3\n");
    }

    #[tokio::test]
    async fn missing_file_is_failure() {
        let dir = TempDir::new().unwrap();

        let output = read(&args("nope.txt", None, None), dir.path()).await;

        assert!(!output.success);
        assert!(output.text.starts_with("error: cannot read nope.txt"));
    }

    #[tokio::test]
    async fn absolute_paths_ignore_working_dir() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("abs.txt");
        std::fs::write(&file, "x\n").unwrap();

        let output = read(
            &args(file.to_str().unwrap(), None, None),
            Path::new("/nonexistent"),
        )
        .await;

        assert!(output.success);
        assert_eq!(output.text, "   1| x\n");
    }
}
