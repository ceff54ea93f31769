pub mod config;
pub mod runner;

pub use config::{default_system_prompt, AgentLoopConfig, DEFAULT_MAX_ROUNDS};
pub use runner::{backfill_cancelled_calls, run_turn, CANCELLED_OUTPUT};
