//! Model client adapters.
//!
//! [`LLMProvider`] is the seam between the agent loop and a hosted model;
//! [`GeminiProvider`] implements it over the Gemini `generateContent` API.

pub mod config;
pub mod protocol;
pub mod provider;
pub mod providers;

pub use config::{Config, ConfigError};
pub use provider::{LLMError, LLMProvider, Result};
pub use providers::GeminiProvider;
