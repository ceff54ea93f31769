use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use agent_core::tools::{execute_tool_call, parse_tool_args, ToolExecutor, ToolResult};
use agent_core::{AgentError, AgentEvent, HistoryError, Session, Turn};
use agent_llm::LLMProvider;

use crate::config::AgentLoopConfig;

pub type Result<T> = std::result::Result<T, AgentError>;

pub const CANCELLED_OUTPUT: &str = "cancelled by user";

/// Drive one user turn to a final answer.
///
/// Appends the user message, then alternates model calls and sequential tool
/// dispatch until the model answers without tool calls. Returns the answer
/// text. On any error the history stays well formed and the session can take
/// the next turn.
pub async fn run_turn(
    session: &mut Session,
    user_input: String,
    llm: &dyn LLMProvider,
    tools: &dyn ToolExecutor,
    event_tx: &mpsc::Sender<AgentEvent>,
    cancel_token: &CancellationToken,
    config: &AgentLoopConfig,
) -> Result<String> {
    let debug_logger = DebugLogger::new(log::log_enabled!(log::Level::Debug));
    let session_id = session.id.clone();

    if cancel_token.is_cancelled() {
        return Err(AgentError::Cancelled);
    }

    session.history.append(Turn::user(user_input))?;

    let working_dir = session.working_dir().to_path_buf();
    let system_prompt = config.system_prompt_for(&working_dir);
    let tool_schemas = tools.list_tools();

    for round in 0..config.max_rounds {
        debug_logger.log_event(
            &session_id,
            "round_start",
            serde_json::json!({
                "round": round + 1,
                "max_rounds": config.max_rounds,
                "history_len": session.history.len(),
            }),
        );

        if cancel_token.is_cancelled() {
            return Err(cancelled(session, event_tx).await?);
        }

        let snapshot = session.history.snapshot();
        let timer = Timer::new("llm_request");
        let message = tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                log::debug!("[{}] Cancelled while waiting for the model", session_id);
                return Err(cancelled(session, event_tx).await?);
            }
            response = llm.chat(&system_prompt, &snapshot, &tool_schemas) => match response {
                Ok(message) => message,
                Err(error) => {
                    let error = AgentError::from(error);
                    log::info!("[{}] Model call failed: {}", session_id, error);
                    let _ = event_tx
                        .send(AgentEvent::Error {
                            message: error.to_string(),
                        })
                        .await;
                    return Err(error);
                }
            },
        };
        timer.debug(&session_id);

        if message.is_empty() {
            let error =
                AgentError::Backend("model returned neither text nor tool calls".to_string());
            log::info!("[{}] {}", session_id, error);
            let _ = event_tx
                .send(AgentEvent::Error {
                    message: error.to_string(),
                })
                .await;
            return Err(error);
        }

        if let Some(text) = message.visible_text() {
            let _ = event_tx
                .send(AgentEvent::ModelText {
                    content: text.to_string(),
                })
                .await;
        }

        if let Err(error) = session.history.append(Turn::Model(message.clone())) {
            let error = match error {
                HistoryError::DuplicateToolCallId(id) => AgentError::Backend(format!(
                    "model returned tool call id '{id}' more than once"
                )),
                other => AgentError::History(other),
            };
            log::info!("[{}] {}", session_id, error);
            let _ = event_tx
                .send(AgentEvent::Error {
                    message: error.to_string(),
                })
                .await;
            return Err(error);
        }

        if message.is_terminal() {
            debug_logger.log_event(
                &session_id,
                "turn_complete",
                serde_json::json!({ "rounds": round + 1 }),
            );
            let _ = event_tx
                .send(AgentEvent::Complete { rounds: round + 1 })
                .await;
            return Ok(message.visible_text().unwrap_or_default().to_string());
        }

        for tool_call in &message.tool_calls {
            let arguments = parse_tool_args(&tool_call.arguments)
                .map(serde_json::Value::Object)
                .unwrap_or_else(|_| tool_call.arguments.clone());

            let _ = event_tx
                .send(AgentEvent::ToolStart {
                    tool_call_id: tool_call.id.clone(),
                    tool_name: tool_call.name.clone(),
                    arguments,
                })
                .await;

            let tool_timer = Timer::new(format!("tool_{}", tool_call.name));
            let (live_tx, mut live_rx) = mpsc::unbounded_channel();
            let execution = execute_tool_call(tool_call, tools, &working_dir, Some(&live_tx));
            tokio::pin!(execution);

            let result = loop {
                tokio::select! {
                    biased;
                    _ = cancel_token.cancelled() => {
                        log::debug!(
                            "[{}] Cancelled during tool '{}' ({})",
                            session_id,
                            tool_call.name,
                            tool_call.id
                        );
                        return Err(cancelled(session, event_tx).await?);
                    }
                    Some(line) = live_rx.recv() => {
                        forward_output(event_tx, &tool_call.id, line).await;
                    }
                    result = &mut execution => break result,
                }
            };
            while let Ok(line) = live_rx.try_recv() {
                forward_output(event_tx, &tool_call.id, line).await;
            }
            tool_timer.debug(&session_id);

            debug_logger.log_event(
                &session_id,
                "tool_complete",
                serde_json::json!({
                    "tool_call_id": tool_call.id,
                    "tool_name": tool_call.name,
                    "success": result.success,
                }),
            );

            let _ = event_tx
                .send(AgentEvent::ToolComplete {
                    tool_call_id: tool_call.id.clone(),
                    result: result.clone(),
                })
                .await;

            session.history.append(Turn::tool_result(result))?;
        }
    }

    log::info!(
        "[{}] No final answer after {} rounds",
        session_id,
        config.max_rounds
    );
    let error = AgentError::RoundLimitExceeded(config.max_rounds);
    let _ = event_tx
        .send(AgentEvent::Error {
            message: error.to_string(),
        })
        .await;
    Err(error)
}

/// Answer every unanswered tool call with a failed "cancelled" result.
///
/// Returns how many results were appended.
pub fn backfill_cancelled_calls(session: &mut Session) -> Result<usize> {
    let pending = session.history.pending_tool_calls().to_vec();
    for call in &pending {
        session.history.append(Turn::tool_result(ToolResult::failure(
            &call.id,
            &call.name,
            CANCELLED_OUTPUT,
        )))?;
    }
    Ok(pending.len())
}

async fn forward_output(event_tx: &mpsc::Sender<AgentEvent>, tool_call_id: &str, line: String) {
    let _ = event_tx
        .send(AgentEvent::ToolOutput {
            tool_call_id: tool_call_id.to_string(),
            line,
        })
        .await;
}

async fn cancelled(
    session: &mut Session,
    event_tx: &mpsc::Sender<AgentEvent>,
) -> Result<AgentError> {
    let filled = backfill_cancelled_calls(session)?;
    if filled > 0 {
        log::debug!(
            "[{}] Back-filled {} cancelled tool call(s)",
            session.id,
            filled
        );
    }
    let _ = event_tx
        .send(AgentEvent::Error {
            message: AgentError::Cancelled.to_string(),
        })
        .await;
    Ok(AgentError::Cancelled)
}

struct DebugLogger {
    enabled: bool,
}

impl DebugLogger {
    fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    fn log_event(&self, session_id: &str, event_type: &str, details: serde_json::Value) {
        if !self.enabled {
            return;
        }

        log::debug!("[{}] {}: {}", session_id, event_type, details);
    }
}

struct Timer {
    name: String,
    start: std::time::Instant,
}

impl Timer {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start: std::time::Instant::now(),
        }
    }

    fn elapsed_ms(&self) -> u128 {
        self.start.elapsed().as_millis()
    }

    fn debug(&self, session_id: &str) {
        log::debug!(
            "[{}] {} completed in {}ms",
            session_id,
            self.name,
            self.elapsed_ms()
        );
    }
}
