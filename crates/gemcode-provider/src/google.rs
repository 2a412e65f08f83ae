//! Google Gemini provider implementation.
//!
//! Calls the Generative Language API's blocking `generateContent` endpoint
//! with function declarations built from the registered tools.

use crate::{
    error::ProviderError,
    message::{ContentPart, Message, Role},
    Completion, GenerateOptions, LanguageModel, ProviderResult, ToolCall, Usage,
};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

/// Default API base URL.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Gemini provider.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiProvider {
    /// Create a new Gemini provider.
    pub fn new(api_key: &str, model: &str) -> ProviderResult<Self> {
        if api_key.is_empty() {
            return Err(ProviderError::missing_api_key("google"));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ProviderError::internal(e.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Override the API base URL (used by tests against a local server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Get the API URL for a blocking completion.
    fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }

    /// Convert our messages to Gemini format.
    fn convert_messages(messages: &[Message]) -> Vec<Value> {
        let mut result = Vec::new();

        for msg in messages {
            let role = match msg.role {
                Role::User => "user",
                Role::Assistant => "model",
                Role::Tool => "function", // Gemini uses "function" for tool results
                Role::System => continue, // System is handled separately
            };

            let parts = convert_parts(&msg.content);

            if !parts.is_empty() {
                result.push(json!({
                    "role": role,
                    "parts": parts
                }));
            }
        }

        result
    }

    /// Convert tools to Gemini format.
    fn convert_tools(tools: &[crate::ToolDefinition]) -> Value {
        if tools.is_empty() {
            return Value::Null;
        }

        let function_declarations: Vec<Value> = tools
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name,
                    "description": tool.description,
                    "parameters": tool.parameters
                })
            })
            .collect();

        json!([{
            "functionDeclarations": function_declarations
        }])
    }
}

/// Convert content parts to Gemini format.
fn convert_parts(parts: &[ContentPart]) -> Vec<Value> {
    parts
        .iter()
        .map(|part| match part {
            ContentPart::Text { text } => json!({
                "text": text
            }),
            ContentPart::ToolUse { id: _, name, input } => json!({
                "functionCall": {
                    "name": name,
                    "args": input
                }
            }),
            ContentPart::ToolResult {
                name,
                content,
                is_error,
                ..
            } => {
                let response = if is_error.unwrap_or(false) {
                    json!({ "error": content })
                } else {
                    json!({ "result": content })
                };
                json!({
                    "functionResponse": {
                        "name": name,
                        "response": response
                    }
                })
            }
        })
        .collect()
}

#[async_trait]
impl LanguageModel for GeminiProvider {
    async fn generate(
        &self,
        messages: Vec<Message>,
        options: GenerateOptions,
    ) -> ProviderResult<Completion> {
        let url = self.generate_url();

        // Extract system instruction from options
        let system_instruction = options.system.as_ref().map(|s| {
            json!({
                "parts": [{"text": s}]
            })
        });

        // Build generation config
        let mut generation_config = json!({});

        if let Some(temp) = options.temperature {
            generation_config["temperature"] = json!(temp);
        }
        if let Some(max_tokens) = options.max_tokens {
            generation_config["maxOutputTokens"] = json!(max_tokens);
        }

        // Build request body
        let mut body = json!({
            "contents": Self::convert_messages(&messages),
            "generationConfig": generation_config
        });

        if let Some(sys) = system_instruction {
            body["systemInstruction"] = sys;
        }

        let tools = Self::convert_tools(&options.tools);
        if !tools.is_null() {
            body["tools"] = tools;
        }

        debug!(
            "Gemini request: {}",
            serde_json::to_string_pretty(&body).unwrap_or_default()
        );

        let response = self.client.post(&url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!("Gemini error response: {} - {}", status, text);
            return Err(ProviderError::api_error(status.as_u16(), text));
        }

        let parsed: GeminiResponse = response.json().await?;

        let usage = parsed
            .usage_metadata
            .as_ref()
            .map(|u| {
                Usage::new(
                    u.prompt_token_count.unwrap_or(0),
                    u.candidates_token_count.unwrap_or(0),
                )
            })
            .unwrap_or_default();

        let candidates = parsed.candidates.unwrap_or_default();
        if candidates.is_empty() {
            return Err(ProviderError::invalid_response(
                "response contained no candidates",
            ));
        }

        let mut text = String::new();
        let mut tool_calls = Vec::new();

        for candidate in candidates {
            let Some(content) = candidate.content else {
                continue;
            };
            for part in content.parts.unwrap_or_default() {
                if let Some(t) = part.text {
                    text.push_str(&t);
                }
                if let Some(fc) = part.function_call {
                    // Gemini returns no call ids; synthesize them per response
                    tool_calls.push(ToolCall {
                        id: format!("call_{}", tool_calls.len()),
                        name: fc.name,
                        arguments: fc.args.unwrap_or_else(|| json!({})),
                    });
                }
            }
        }

        Ok(Completion {
            text,
            tool_calls,
            usage,
        })
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    fn provider_id(&self) -> &str {
        "google"
    }
}

/// Gemini response structure.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiContent {
    parts: Option<Vec<GeminiPart>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    text: Option<String>,
    function_call: Option<GeminiFunctionCall>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiFunctionCall {
    name: String,
    args: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
}
