use std::path::Path;

use agent_core::tools::ToolOutput;
use serde::Deserialize;
use tokio::fs;

use super::resolve_path;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WriteArgs {
    pub path: String,
    pub content: String,
}

/// Create or overwrite a file, creating missing parent directories.
pub async fn write(args: &WriteArgs, working_dir: &Path) -> ToolOutput {
    let path = resolve_path(working_dir, &args.path);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent).await {
            return ToolOutput::failure(format!(
                "error: cannot create directory {}: {}",
                parent.display(),
                e
            ));
        }
    }

    match fs::write(&path, &args.content).await {
        Ok(()) => {
            log::debug!("Wrote {} bytes to {}", args.content.len(), path.display());
            ToolOutput::ok("ok")
        }
        Err(e) => ToolOutput::failure(format!("error: cannot write {}: {}", args.path, e)),
    }
}
