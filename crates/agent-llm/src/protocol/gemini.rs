//! Google Gemini protocol conversion implementation.
//!
//! Gemini API has a unique format:
//! - Messages are called "contents"
//! - Role is "user" or "model" (not "assistant")
//! - Content is an array of "parts"
//! - System instructions are separate from messages
//! - Tool results travel as `functionResponse` parts in a "user" content
//!
//! # Example Gemini Request
//! ```json
//! {
//!   "contents": [
//!     {
//!       "role": "user",
//!       "parts": [{"text": "Hello"}]
//!     }
//!   ],
//!   "systemInstruction": {
//!     "parts": [{"text": "You are helpful"}]
//!   },
//!   "tools": [{"functionDeclarations": [...]}],
//!   "generationConfig": {"maxOutputTokens": 8192}
//! }
//! ```

use crate::protocol::{FromProvider, ProtocolError, ProtocolResult, ToProvider};
use agent_core::tools::{ToolCall, ToolResult, ToolSchema};
use agent_core::{ModelMessage, Turn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Gemini protocol converter.
pub struct GeminiProtocol;

// ============================================================================
// Gemini API Types
// ============================================================================

/// Gemini request format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    /// Conversation history
    pub contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<GeminiTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiGenerationConfig {
    pub max_output_tokens: u32,
}

/// Gemini message/content format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeminiContent {
    /// "user" or "model"; absent on the system instruction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

/// Gemini content part
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Set on reasoning summaries, which are not part of the answer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
    /// Opaque token that must be echoed back alongside the function call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought_signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<GeminiFunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_response: Option<GeminiFunctionResponse>,
}

impl GeminiPart {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }
}

/// Gemini function call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiFunctionCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub args: Value,
}

/// Gemini function response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiFunctionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub response: Value,
}

/// Gemini tool definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiTool {
    pub function_declarations: Vec<GeminiFunctionDeclaration>,
}

/// Gemini function declaration (tool schema)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiFunctionDeclaration {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub parameters: Value,
}

/// Gemini response format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_feedback: Option<GeminiPromptFeedback>,
}

/// Gemini response candidate
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<GeminiContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiPromptFeedback {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<String>,
}

// ============================================================================
// Gemini → Internal (FromProvider)
// ============================================================================

impl FromProvider<GeminiResponse> for ModelMessage {
    fn from_provider(response: GeminiResponse) -> ProtocolResult<Self> {
        let candidate = match response.candidates.into_iter().next() {
            Some(candidate) => candidate,
            None => {
                if let Some(reason) = response
                    .prompt_feedback
                    .and_then(|feedback| feedback.block_reason)
                {
                    return Err(ProtocolError::Blocked(reason));
                }
                return Err(ProtocolError::MissingField("candidates".to_string()));
            }
        };

        let content = candidate.content.ok_or_else(|| {
            ProtocolError::InvalidContent(format!(
                "candidate has no content (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            ))
        })?;

        let mut text_parts = Vec::new();
        let mut tool_calls = Vec::new();

        for part in content.parts {
            if part.thought == Some(true) {
                continue;
            }

            if let Some(text) = part.text {
                text_parts.push(text);
            }

            if let Some(func_call) = part.function_call {
                if func_call.name.trim().is_empty() {
                    return Err(ProtocolError::InvalidToolCall(
                        "function call without a name".to_string(),
                    ));
                }

                let id = func_call
                    .id
                    .filter(|id| !id.is_empty())
                    .unwrap_or_else(|| format!("call_{}", uuid::Uuid::new_v4().simple()));

                tool_calls.push(ToolCall {
                    id,
                    name: func_call.name,
                    arguments: func_call.args,
                    thought_signature: part.thought_signature,
                });
            }
        }

        let text = text_parts.concat();
        let text = if text.trim().is_empty() { None } else { Some(text) };

        Ok(ModelMessage::with_tool_calls(text, tool_calls))
    }
}

// ============================================================================
// Internal → Gemini (ToProvider)
// ============================================================================

impl ToProvider<GeminiFunctionDeclaration> for ToolSchema {
    fn to_provider(&self) -> ProtocolResult<GeminiFunctionDeclaration> {
        Ok(GeminiFunctionDeclaration {
            name: self.name.clone(),
            description: Some(self.description.clone()),
            parameters: self.json_schema(),
        })
    }
}

impl ToProvider<GeminiPart> for ToolCall {
    fn to_provider(&self) -> ProtocolResult<GeminiPart> {
        let args = match &self.arguments {
            Value::Object(_) => self.arguments.clone(),
            Value::Null => json!({}),
            Value::String(raw) => serde_json::from_str(raw).unwrap_or_else(|_| json!({})),
            _ => json!({}),
        };

        Ok(GeminiPart {
            thought_signature: self.thought_signature.clone(),
            function_call: Some(GeminiFunctionCall {
                id: Some(self.id.clone()),
                name: self.name.clone(),
                args,
            }),
            ..Default::default()
        })
    }
}

impl ToProvider<GeminiPart> for ToolResult {
    fn to_provider(&self) -> ProtocolResult<GeminiPart> {
        let response = if self.success {
            json!({ "output": self.output })
        } else {
            json!({ "error": self.output })
        };

        Ok(GeminiPart {
            function_response: Some(GeminiFunctionResponse {
                id: Some(self.tool_call_id.clone()),
                name: self.tool_name.clone(),
                response,
            }),
            ..Default::default()
        })
    }
}

impl ToProvider<GeminiContent> for ModelMessage {
    fn to_provider(&self) -> ProtocolResult<GeminiContent> {
        let mut parts = Vec::with_capacity(self.tool_calls.len() + 1);

        if let Some(text) = self.text.as_deref().filter(|text| !text.trim().is_empty()) {
            parts.push(GeminiPart::text(text));
        }
        for call in &self.tool_calls {
            parts.push(call.to_provider()?);
        }

        Ok(GeminiContent {
            role: Some("model".to_string()),
            parts,
        })
    }
}

impl GeminiProtocol {
    /// Map history onto Gemini contents.
    ///
    /// Consecutive tool results share one "user" content so that every
    /// model turn with function calls is answered by a single turn.
    pub fn contents(history: &[Turn]) -> ProtocolResult<Vec<GeminiContent>> {
        let mut contents: Vec<GeminiContent> = Vec::new();
        let mut grouping_results = false;

        for turn in history {
            match turn {
                Turn::User { content } => {
                    grouping_results = false;
                    contents.push(GeminiContent {
                        role: Some("user".to_string()),
                        parts: vec![GeminiPart::text(content.clone())],
                    });
                }
                Turn::Model(message) => {
                    grouping_results = false;
                    let content = message.to_provider()?;
                    if !content.parts.is_empty() {
                        contents.push(content);
                    }
                }
                Turn::ToolResult(result) => {
                    let part = result.to_provider()?;
                    match contents.last_mut() {
                        Some(last) if grouping_results => last.parts.push(part),
                        _ => contents.push(GeminiContent {
                            role: Some("user".to_string()),
                            parts: vec![part],
                        }),
                    }
                    grouping_results = true;
                }
            }
        }

        Ok(contents)
    }

    pub fn build_request(
        system_prompt: &str,
        history: &[Turn],
        tools: &[ToolSchema],
        max_output_tokens: u32,
    ) -> ProtocolResult<GeminiRequest> {
        let system_instruction = if system_prompt.trim().is_empty() {
            None
        } else {
            Some(GeminiContent {
                role: None,
                parts: vec![GeminiPart::text(system_prompt)],
            })
        };

        let tools = if tools.is_empty() {
            None
        } else {
            let function_declarations = tools
                .iter()
                .map(|tool| tool.to_provider())
                .collect::<ProtocolResult<Vec<GeminiFunctionDeclaration>>>()?;
            Some(vec![GeminiTool {
                function_declarations,
            }])
        };

        Ok(GeminiRequest {
            contents: Self::contents(history)?,
            system_instruction,
            tools,
            generation_config: Some(GeminiGenerationConfig { max_output_tokens }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::tools::ParamType;

    fn response(value: Value) -> GeminiResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let schema = ToolSchema::new("read", "Read file")
            .required("path", ParamType::String, "Path");
        let request = GeminiProtocol::build_request(
            "Be brief",
            &[Turn::user("hi")],
            &[schema],
            8192,
        )
        .unwrap();

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "Be brief");
        assert!(value["systemInstruction"].get("role").is_none());
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 8192);
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hi");

        let declaration = &value["tools"][0]["functionDeclarations"][0];
        assert_eq!(declaration["name"], "read");
        assert_eq!(declaration["parameters"]["properties"]["path"]["type"], "string");
        assert_eq!(declaration["parameters"]["required"], json!(["path"]));
    }

    #[test]
    fn test_tool_results_are_grouped_after_model_turn() {
        let mut call_a = ToolCall::new("a", "write", json!({"path": "x", "content": "1"}));
        call_a.thought_signature = Some("sig-a".to_string());
        let call_b = ToolCall::new("b", "read", json!({"path": "x"}));

        let history = vec![
            Turn::user("do it"),
            Turn::model(Some("On it.".to_string()), vec![call_a, call_b]),
            Turn::tool_result(ToolResult::success("a", "write", "ok")),
            Turn::tool_result(ToolResult::failure("b", "read", "error: nope")),
            Turn::model(Some("Done".to_string()), vec![]),
        ];

        let value = serde_json::to_value(GeminiProtocol::contents(&history).unwrap()).unwrap();
        let contents = value.as_array().unwrap();
        assert_eq!(contents.len(), 4);

        let model = &contents[1];
        assert_eq!(model["role"], "model");
        assert_eq!(model["parts"][0]["text"], "On it.");
        assert_eq!(model["parts"][1]["functionCall"]["id"], "a");
        assert_eq!(model["parts"][1]["functionCall"]["args"]["content"], "1");
        assert_eq!(model["parts"][1]["thoughtSignature"], "sig-a");
        assert!(model["parts"][2].get("thoughtSignature").is_none());

        let results = &contents[2];
        assert_eq!(results["role"], "user");
        assert_eq!(results["parts"].as_array().unwrap().len(), 2);
        assert_eq!(results["parts"][0]["functionResponse"]["id"], "a");
        assert_eq!(results["parts"][0]["functionResponse"]["response"]["output"], "ok");
        assert_eq!(results["parts"][1]["functionResponse"]["name"], "read");
        assert_eq!(
            results["parts"][1]["functionResponse"]["response"]["error"],
            "error: nope"
        );

        assert_eq!(contents[3]["parts"][0]["text"], "Done");
    }

    #[test]
    fn test_response_text_only() {
        let message = ModelMessage::from_provider(response(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Hello "}, {"text": "there"}]},
                "finishReason": "STOP"
            }]
        })))
        .unwrap();

        assert_eq!(message.text.as_deref(), Some("Hello there"));
        assert!(message.is_terminal());
    }

    #[test]
    fn test_response_function_calls_skip_thoughts() {
        let message = ModelMessage::from_provider(response(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [
                    {"text": "thinking hard", "thought": true},
                    {"functionCall": {"id": "fc1", "name": "glob", "args": {"pattern": "*.rs"}},
                     "thoughtSignature": "opaque"},
                    {"functionCall": {"name": "read", "args": {"path": "a"}}}
                ]}
            }]
        })))
        .unwrap();

        assert_eq!(message.text, None);
        assert_eq!(message.tool_calls.len(), 2);
        assert_eq!(message.tool_calls[0].id, "fc1");
        assert_eq!(message.tool_calls[0].arguments, json!({"pattern": "*.rs"}));
        assert_eq!(message.tool_calls[0].thought_signature.as_deref(), Some("opaque"));
        assert!(message.tool_calls[1].id.starts_with("call_"));
        assert_ne!(message.tool_calls[1].id, "call_");
    }

    #[test]
    fn test_response_without_candidates() {
        let err = ModelMessage::from_provider(response(json!({"candidates": []}))).unwrap_err();
        assert!(matches!(err, ProtocolError::MissingField(_)));

        let err = ModelMessage::from_provider(response(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        })))
        .unwrap_err();
        assert!(matches!(err, ProtocolError::Blocked(reason) if reason == "SAFETY"));
    }

    #[test]
    fn test_response_candidate_without_content() {
        let err = ModelMessage::from_provider(response(json!({
            "candidates": [{"finishReason": "RECITATION"}]
        })))
        .unwrap_err();

        assert!(err.to_string().contains("RECITATION"));
    }

    #[test]
    fn test_string_arguments_are_sent_as_objects() {
        let call = ToolCall::new("c", "bash", json!(r#"{"command": "ls"}"#));
        let part = call.to_provider().unwrap();

        assert_eq!(part.function_call.unwrap().args, json!({"command": "ls"}));
    }
}
