use std::path::Path;

pub const DEFAULT_MAX_ROUNDS: usize = 50;

/// Configuration for the agent loop.
#[derive(Debug, Clone)]
pub struct AgentLoopConfig {
    /// Model calls allowed per user turn before giving up.
    pub max_rounds: usize,
    /// Overrides the default prompt built from the working directory.
    pub system_prompt: Option<String>,
}

impl Default for AgentLoopConfig {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            system_prompt: None,
        }
    }
}

impl AgentLoopConfig {
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn system_prompt_for(&self, working_dir: &Path) -> String {
        self.system_prompt
            .clone()
            .unwrap_or_else(|| default_system_prompt(working_dir))
    }
}

pub fn default_system_prompt(working_dir: &Path) -> String {
    format!("Concise coding assistant. cwd: {}", working_dir.display())
}
