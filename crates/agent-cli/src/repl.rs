use std::io::{BufRead, Write};

use colored::Colorize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use agent_core::{AgentError, AgentEvent, Session};
use agent_llm::GeminiProvider;
use agent_loop::{run_turn, AgentLoopConfig};
use agent_tools::BuiltinToolExecutor;

use crate::render;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// What a line typed at the prompt asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Quit,
    Clear,
    Empty,
    Message(String),
}

pub fn parse_input(line: &str) -> Input {
    match line.trim() {
        "" => Input::Empty,
        "/q" | "exit" => Input::Quit,
        "/c" => Input::Clear,
        message => Input::Message(message.to_string()),
    }
}

pub struct Repl {
    session: Session,
    llm: GeminiProvider,
    tools: BuiltinToolExecutor,
    config: AgentLoopConfig,
}

impl Repl {
    pub fn new(
        session: Session,
        llm: GeminiProvider,
        tools: BuiltinToolExecutor,
        config: AgentLoopConfig,
    ) -> Self {
        Self {
            session,
            llm,
            tools,
            config,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        println!(
            "{}\n",
            render::banner(self.llm.model(), self.session.working_dir())
        );

        let mut lines = spawn_stdin_reader();

        loop {
            println!("{}", render::separator());
            print!("{} ", "❯".bold().blue());
            std::io::stdout().flush()?;

            let line = tokio::select! {
                line = lines.recv() => line,
                _ = tokio::signal::ctrl_c() => None,
            };
            let Some(line) = line else {
                println!();
                return Ok(());
            };
            println!("{}", render::separator());

            match parse_input(&line) {
                Input::Empty => continue,
                Input::Quit => return Ok(()),
                Input::Clear => {
                    self.session.clear();
                    log::debug!("[{}] History cleared", self.session.id);
                    println!("{}", "⏺ Cleared conversation".green());
                }
                Input::Message(message) => {
                    if let Err(error) = self.turn(message).await {
                        println!("\n{}", render::error_line(&error.to_string()));
                    }
                    println!();
                }
            }
        }
    }

    /// Run one turn, printing events as they arrive. Ctrl-C cancels it.
    async fn turn(&mut self, message: String) -> Result<String, AgentError> {
        let (event_tx, mut event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let cancel_token = CancellationToken::new();

        let turn = run_turn(
            &mut self.session,
            message,
            &self.llm,
            &self.tools,
            &event_tx,
            &cancel_token,
            &self.config,
        );
        tokio::pin!(turn);
        let interrupt = tokio::signal::ctrl_c();
        tokio::pin!(interrupt);

        let outcome = loop {
            tokio::select! {
                outcome = &mut turn => break outcome,
                Some(event) = event_rx.recv() => print_event(&event),
                _ = &mut interrupt, if !cancel_token.is_cancelled() => {
                    log::debug!("Interrupt received, cancelling turn");
                    cancel_token.cancel();
                }
            }
        };

        while let Ok(event) = event_rx.try_recv() {
            print_event(&event);
        }
        outcome
    }
}

fn print_event(event: &AgentEvent) {
    if let Some(text) = render::render_event(event) {
        println!("{text}");
    }
}

/// Read stdin on a plain thread so a pending read never blocks shutdown.
/// The channel closes on EOF.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(1);
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}
