//! Model provider abstraction for gemcode.
//!
//! This crate provides a unified interface for calling an LLM completion
//! endpoint with function-calling support. The only production backend is
//! Google Gemini; [`scripted::ScriptedProvider`] exists for tests.

pub mod error;
pub mod google;
pub mod message;
pub mod scripted;

pub use error::{ProviderError, ProviderResult};
pub use google::GeminiProvider;
pub use message::{ContentPart, Message, Role};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Options for a completion request.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Temperature for sampling (0.0-1.0).
    pub temperature: Option<f32>,
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
    /// System prompt.
    pub system: Option<String>,
    /// Available tools.
    pub tools: Vec<ToolDefinition>,
}

/// A tool definition for the model.
#[derive(Debug, Clone)]
pub struct ToolDefinition {
    /// Tool name.
    pub name: String,
    /// Tool description.
    pub description: String,
    /// JSON Schema for the tool parameters.
    pub parameters: Value,
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    /// Call ID. Gemini does not supply one, so providers synthesize it.
    pub id: String,
    /// Tool name.
    pub name: String,
    /// Arguments as a JSON object.
    pub arguments: Value,
}

/// Token usage information.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    /// Input (prompt) tokens used.
    pub input_tokens: u32,
    /// Output (candidate) tokens generated.
    pub output_tokens: u32,
}

impl Usage {
    /// Create a new usage with input and output tokens.
    pub fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    /// Total tokens (input + output).
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }

    /// Merge with another usage (adding both counts).
    pub fn merge(&mut self, other: &Usage) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
    }
}

/// A complete model response for one turn.
#[derive(Debug, Clone, Default)]
pub struct Completion {
    /// Concatenated text content of the response.
    pub text: String,
    /// Tool invocations requested by the model, in request order.
    pub tool_calls: Vec<ToolCall>,
    /// Token usage for this call.
    pub usage: Usage,
}

impl Completion {
    /// Whether the model produced a final answer: text with no tool calls.
    pub fn is_final(&self) -> bool {
        self.tool_calls.is_empty() && !self.text.is_empty()
    }
}

/// The main trait for language models.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate a single completion for the conversation.
    async fn generate(
        &self,
        messages: Vec<Message>,
        options: GenerateOptions,
    ) -> ProviderResult<Completion>;

    /// Get the model ID (e.g. "gemini-2.0-flash-001").
    fn model_id(&self) -> &str;

    /// Get the provider ID (e.g. "google").
    fn provider_id(&self) -> &str;
}

/// A boxed language model for dynamic dispatch.
pub type BoxedLanguageModel = Arc<dyn LanguageModel>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_merge() {
        let mut usage1 = Usage::new(100, 50);
        let usage2 = Usage::new(200, 100);

        usage1.merge(&usage2);

        assert_eq!(usage1.input_tokens, 300);
        assert_eq!(usage1.output_tokens, 150);
        assert_eq!(usage1.total(), 450);
    }

    #[test]
    fn test_completion_is_final() {
        let done = Completion {
            text: "All set.".to_string(),
            ..Default::default()
        };
        assert!(done.is_final());

        let empty = Completion::default();
        assert!(!empty.is_final());

        let pending = Completion {
            text: "Checking the file.".to_string(),
            tool_calls: vec![ToolCall {
                id: "call_0".to_string(),
                name: "read_file".to_string(),
                arguments: serde_json::json!({"file_path": "main.py"}),
            }],
            ..Default::default()
        };
        assert!(!pending.is_final());
    }
}
