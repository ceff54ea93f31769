use std::path::Path;
use std::process::Stdio;

use agent_core::tools::{ToolOutput, ToolOutputSender};
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::time::{timeout, Duration};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const MAX_OUTPUT_CHARS: usize = 30_000;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BashArgs {
    pub command: String,
    /// Seconds before the process is killed.
    #[serde(default)]
    pub timeout: Option<u64>,
}

/// Run `sh -c command` in the working directory.
///
/// Output is collected line by line as it arrives and each line is sent to
/// `live`, so whatever the command printed survives a timeout. The child is
/// killed if this future is dropped, which is how turn cancellation stops it.
pub async fn bash(
    args: &BashArgs,
    working_dir: &Path,
    live: Option<&ToolOutputSender>,
) -> ToolOutput {
    let timeout_secs = args.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS).max(1);

    let child = Command::new("sh")
        .arg("-c")
        .arg(&args.command)
        .current_dir(working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn();

    let mut child = match child {
        Ok(child) => child,
        Err(e) => return ToolOutput::failure(format!("error: failed to start sh: {e}")),
    };

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let mut stdout_text = String::new();
    let mut stderr_text = String::new();

    let finished = timeout(Duration::from_secs(timeout_secs), async {
        let (status, (), ()) = tokio::join!(
            child.wait(),
            collect_lines(stdout, &mut stdout_text, live),
            collect_lines(stderr, &mut stderr_text, live),
        );
        status
    })
    .await;

    let mut combined = stdout_text;
    combined.push_str(&stderr_text);
    let text = truncate_output(combined);

    let status = match finished {
        Ok(Ok(status)) => status,
        Ok(Err(e)) => return ToolOutput::failure(format!("error: command failed: {e}")),
        Err(_) => {
            log::debug!("Command timed out after {}s: {}", timeout_secs, args.command);
            if let Err(e) = child.start_kill() {
                log::debug!("Failed to kill timed out command: {}", e);
            }
            let partial = text.trim_end();
            let note = format!("(timed out after {timeout_secs}s)");
            return if partial.is_empty() {
                ToolOutput::failure(note)
            } else {
                ToolOutput::failure(format!("{partial}\n{note}"))
            };
        }
    };

    if status.success() {
        if text.trim().is_empty() {
            ToolOutput::ok("(empty)")
        } else {
            ToolOutput::ok(text)
        }
    } else {
        let code = status
            .code()
            .map_or_else(|| "signal".to_string(), |code| code.to_string());
        let text = if text.trim().is_empty() {
            format!("(exit code {code})")
        } else if text.ends_with('\n') {
            format!("{text}(exit code {code})")
        } else {
            format!("{text}\n(exit code {code})")
        };
        ToolOutput::failure(text)
    }
}

/// Append everything `reader` yields to `buffer`, forwarding each line to `live`.
async fn collect_lines<R>(reader: Option<R>, buffer: &mut String, live: Option<&ToolOutputSender>)
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return;
    };
    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();

    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line).await {
            Ok(0) => break,
            Ok(_) => {
                let text = String::from_utf8_lossy(&line);
                if let Some(live) = live {
                    let _ = live.send(text.trim_end_matches(['\n', '\r']).to_string());
                }
                buffer.push_str(&text);
            }
            Err(e) => {
                log::debug!("Stopped reading command output: {}", e);
                break;
            }
        }
    }
}

fn truncate_output(text: String) -> String {
    let total = text.chars().count();
    if total <= MAX_OUTPUT_CHARS {
        return text;
    }
    let mut kept: String = text.chars().take(MAX_OUTPUT_CHARS).collect();
    kept.push_str(&format!("\n... (output truncated, {total} chars total)\n"));
    kept
}
