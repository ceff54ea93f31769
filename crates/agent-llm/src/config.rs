use std::fmt;

use thiserror::Error;

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 8192;

pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const MODEL_VAR: &str = "MODEL";
pub const API_BASE_VAR: &str = "GEMINI_API_BASE";
pub const MAX_OUTPUT_TOKENS_VAR: &str = "MAX_OUTPUT_TOKENS";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {name}: '{value}'")]
    InvalidValue { name: String, value: String },
}

/// Backend settings, read once at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    pub max_output_tokens: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_key = get(API_KEY_VAR).ok_or_else(|| ConfigError::MissingEnvVar(API_KEY_VAR.to_string()))?;
        let model = get(MODEL_VAR).unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let api_base = get(API_BASE_VAR)
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        let max_output_tokens = match get(MAX_OUTPUT_TOKENS_VAR) {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|tokens| *tokens > 0)
                .ok_or(ConfigError::InvalidValue {
                    name: MAX_OUTPUT_TOKENS_VAR.to_string(),
                    value: raw,
                })?,
            None => DEFAULT_MAX_OUTPUT_TOKENS,
        };

        Ok(Self {
            api_key,
            api_base,
            model,
            max_output_tokens,
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"***")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("max_output_tokens", &self.max_output_tokens)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let config = Config::from_lookup(lookup(&[("GEMINI_API_KEY", "secret")])).unwrap();

        assert_eq!(config.api_key, "secret");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.max_output_tokens, 8192);
    }

    #[test]
    fn missing_key_is_an_error() {
        let err = Config::from_lookup(lookup(&[("MODEL", "x")])).unwrap_err();
        assert_eq!(err, ConfigError::MissingEnvVar("GEMINI_API_KEY".to_string()));

        let err = Config::from_lookup(lookup(&[("GEMINI_API_KEY", "   ")])).unwrap_err();
        assert_eq!(err, ConfigError::MissingEnvVar("GEMINI_API_KEY".to_string()));
    }

    #[test]
    fn overrides_are_read() {
        let config = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "k"),
            ("MODEL", "gemini-2.5-pro"),
            ("GEMINI_API_BASE", "http://localhost:9000/v1beta/"),
            ("MAX_OUTPUT_TOKENS", "1024"),
        ]))
        .unwrap();

        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.api_base, "http://localhost:9000/v1beta");
        assert_eq!(config.max_output_tokens, 1024);
    }

    #[test]
    fn invalid_token_limit_is_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "k"),
            ("MAX_OUTPUT_TOKENS", "lots"),
        ]))
        .unwrap_err();

        assert_eq!(
            err,
            ConfigError::InvalidValue {
                name: "MAX_OUTPUT_TOKENS".to_string(),
                value: "lots".to_string(),
            }
        );
    }

    #[test]
    fn debug_masks_api_key() {
        let config = Config::from_lookup(lookup(&[("GEMINI_API_KEY", "super-secret")])).unwrap();
        let rendered = format!("{config:?}");

        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("gemini-3-flash-preview"));
    }
}
