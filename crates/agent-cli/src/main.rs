mod logging;
mod render;
mod repl;

use std::path::PathBuf;

use clap::Parser;

use agent_core::Session;
use agent_llm::{Config, GeminiProvider};
use agent_loop::{AgentLoopConfig, DEFAULT_MAX_ROUNDS};
use agent_tools::BuiltinToolExecutor;

use logging::init_logging;
use repl::Repl;

#[derive(Parser, Debug)]
#[command(name = "nanocode")]
#[command(about = "Minimal agentic coding assistant backed by Gemini")]
#[command(version)]
struct Cli {
    /// Model name (overrides MODEL)
    #[arg(long)]
    model: Option<String>,

    /// Model calls allowed per user turn
    #[arg(long, env = "NANOCODE_MAX_ROUNDS", default_value_t = DEFAULT_MAX_ROUNDS, value_parser = parse_max_rounds)]
    max_rounds: usize,

    /// Enable debug logging
    #[arg(long, short)]
    debug: bool,
}

fn parse_max_rounds(value: &str) -> Result<usize, String> {
    match value.trim().parse::<usize>() {
        Ok(rounds) if rounds >= 1 => Ok(rounds),
        _ => Err(format!("expected a positive integer, got '{value}'")),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // before clap and logging so .env can set NANOCODE_MAX_ROUNDS and RUST_LOG
    let env_files = load_env_files();

    let cli = Cli::parse();
    init_logging(cli.debug);

    for path in &env_files {
        log::debug!("Loaded environment from {}", path.display());
    }

    let mut config = Config::from_env()?;
    if let Some(model) = cli.model {
        config = config.with_model(model);
    }
    log::debug!("Configuration: {:?}", config);

    let tools = BuiltinToolExecutor::new()?;
    let llm = GeminiProvider::from_config(&config);
    let loop_config = AgentLoopConfig::default().with_max_rounds(cli.max_rounds);

    let working_dir = std::env::current_dir()?;
    let session = Session::new(working_dir);
    log::info!("[{}] Session started, max_rounds={}", session.id, cli.max_rounds);

    let mut repl = Repl::new(session, llm, tools, loop_config);
    repl.run().await
}

/// Load `.env` from the current directory, then the one next to the
/// executable. Variables already set are never overridden.
fn load_env_files() -> Vec<PathBuf> {
    let mut loaded = Vec::new();

    if let Ok(path) = dotenvy::dotenv() {
        loaded.push(path);
    }

    let beside_exe = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(".env")))
        .filter(|path| path.is_file() && !loaded.contains(path));
    if let Some(path) = beside_exe {
        if dotenvy::from_path(&path).is_ok() {
            loaded.push(path);
        }
    }

    loaded
}
