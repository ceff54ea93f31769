//! LLM Providers
//!
//! This module contains the LLM provider implementations.

pub mod gemini;

pub use gemini::GeminiProvider;
