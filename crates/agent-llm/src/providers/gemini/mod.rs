//! Google Gemini provider implementation.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::config::{Config, DEFAULT_API_BASE, DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_MODEL};
use crate::protocol::gemini::GeminiResponse;
use crate::protocol::{FromProvider, GeminiProtocol};
use crate::provider::{LLMError, LLMProvider, Result};
use agent_core::{tools::ToolSchema, ModelMessage, Turn};

/// Google Gemini API provider.
///
/// Every call posts the full history to `models/{model}:generateContent`;
/// the provider keeps no conversation state of its own.
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_output_tokens: u32,
}

impl GeminiProvider {
    /// Create a new Gemini provider with an API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_key.clone())
            .with_base_url(config.api_base.clone())
            .with_model(config.model.clone())
            .with_max_output_tokens(config.max_output_tokens)
    }

    /// Set a custom base URL (e.g., for proxies or alternative endpoints).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    async fn chat(
        &self,
        system_prompt: &str,
        history: &[Turn],
        tools: &[ToolSchema],
    ) -> Result<ModelMessage> {
        let request =
            GeminiProtocol::build_request(system_prompt, history, tools, self.max_output_tokens)?;

        log::debug!(
            "Gemini request: model={}, contents={}, tools={}",
            self.model,
            request.contents.len(),
            tools.len()
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();

            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                return Err(LLMError::Transport(format!(
                    "Gemini authentication failed (HTTP {}): {}. Please check your API key.",
                    status.as_u16(),
                    text
                )));
            }

            return Err(LLMError::Backend(format!(
                "Gemini API error: HTTP {}: {}",
                status.as_u16(),
                text
            )));
        }

        let body = response.text().await?;
        let parsed: GeminiResponse = serde_json::from_str(&body)
            .map_err(|e| LLMError::Backend(format!("malformed Gemini response: {}", e)))?;

        let message = ModelMessage::from_provider(parsed)?;
        log::debug!(
            "Gemini response: text={} chars, tool_calls={}",
            message.text.as_deref().map_or(0, str::len),
            message.tool_calls.len()
        );

        Ok(message)
    }
}
