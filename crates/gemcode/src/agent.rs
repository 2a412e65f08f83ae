//! The agent loop.
//!
//! Drives the model through repeated generate calls, dispatching any
//! function calls to the tool registry and feeding the results back,
//! until the model replies with plain text or the turn cap is hit.

use gemcode_provider::{
    BoxedLanguageModel, Completion, GenerateOptions, Message, ProviderError, ToolDefinition,
};
use gemcode_provider::{ContentPart, Role, Usage};
use gemcode_tools::{ToolContext, ToolRegistry};
use thiserror::Error;
use tracing::{debug, warn};

/// Instructions sent with every request.
pub const SYSTEM_PROMPT: &str = "\
You are a helpful AI coding agent.

When a user asks a question or makes a request, make a function call plan. You can perform the following operations:

- List files and directories
- Read file contents
- Execute Python files with optional arguments
- Write or overwrite files

All paths you provide should be relative to the working directory. You do not need to specify the working directory in your function calls as it is automatically injected for security reasons.";

/// Errors that end an agent run without a final answer.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The provider failed in a way a retry did not fix.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The model never produced a final answer.
    #[error("no final response after {0} turns")]
    TurnLimit(u32),

    /// The run was cancelled.
    #[error("cancelled")]
    Cancelled,
}

/// A finished agent run.
#[derive(Debug)]
pub struct AgentOutcome {
    /// The model's final text answer.
    pub text: String,
    /// Tokens consumed across all turns.
    pub usage: Usage,
    /// Number of turns taken.
    pub turns: u32,
}

/// Drives a model and a tool registry through a conversation.
pub struct Agent {
    model: BoxedLanguageModel,
    registry: ToolRegistry,
    ctx: ToolContext,
    max_turns: u32,
    verbose: bool,
}

impl Agent {
    /// Create an agent.
    pub fn new(
        model: BoxedLanguageModel,
        registry: ToolRegistry,
        ctx: ToolContext,
        max_turns: u32,
        verbose: bool,
    ) -> Self {
        Self {
            model,
            registry,
            ctx,
            max_turns,
            verbose,
        }
    }

    /// Run the loop on a user prompt until the model answers in plain text.
    pub async fn run(&self, prompt: &str) -> Result<AgentOutcome, AgentError> {
        let tool_defs: Vec<ToolDefinition> = self
            .registry
            .all()
            .map(|tool| ToolDefinition {
                name: tool.id().to_string(),
                description: tool.description().to_string(),
                parameters: tool.parameters_schema(),
            })
            .collect();

        let options = GenerateOptions {
            system: Some(SYSTEM_PROMPT.to_string()),
            tools: tool_defs,
            ..Default::default()
        };

        let mut messages = vec![Message::user(prompt)];
        let mut usage = Usage::default();

        for turn in 1..=self.max_turns {
            if self.ctx.abort.is_cancelled() {
                return Err(AgentError::Cancelled);
            }

            debug!(turn, messages = messages.len(), "requesting completion");

            let completion = self.generate_with_retry(&messages, &options).await?;
            usage.merge(&completion.usage);

            if self.verbose {
                println!("Prompt tokens: {}", completion.usage.input_tokens);
                println!("Response tokens: {}", completion.usage.output_tokens);
            }

            if completion.is_final() {
                return Ok(AgentOutcome {
                    text: completion.text,
                    usage,
                    turns: turn,
                });
            }

            self.dispatch_turn(&mut messages, completion).await?;
        }

        Err(AgentError::TurnLimit(self.max_turns))
    }

    /// Call the provider, retrying once on transient failures.
    async fn generate_with_retry(
        &self,
        messages: &[Message],
        options: &GenerateOptions,
    ) -> Result<Completion, AgentError> {
        match self
            .model
            .generate(messages.to_vec(), options.clone())
            .await
        {
            Ok(completion) => Ok(completion),
            Err(err) if err.is_retryable() => {
                warn!(error = %err, "provider call failed, retrying once");
                Ok(self.model.generate(messages.to_vec(), options.clone()).await?)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Record the assistant turn and execute every function call in it.
    async fn dispatch_turn(
        &self,
        messages: &mut Vec<Message>,
        completion: Completion,
    ) -> Result<(), AgentError> {
        let mut assistant = Message {
            role: Role::Assistant,
            content: Vec::new(),
        };
        if !completion.text.is_empty() {
            assistant = assistant.with_part(ContentPart::text(&completion.text));
        }
        for call in &completion.tool_calls {
            assistant = assistant.with_part(ContentPart::tool_use(
                &call.id,
                &call.name,
                call.arguments.clone(),
            ));
        }
        messages.push(assistant);

        for call in completion.tool_calls {
            if self.ctx.abort.is_cancelled() {
                return Err(AgentError::Cancelled);
            }

            if self.verbose {
                println!("Calling function: {}({})", call.name, call.arguments);
            } else {
                println!(" - Calling function: {}", call.name);
            }

            let Some(tool) = self.registry.get(&call.name) else {
                warn!(name = %call.name, "model called an unregistered function");
                messages.push(Message::tool_error(
                    &call.id,
                    &call.name,
                    format!("Unknown function: {}", call.name),
                ));
                continue;
            };

            match tool.execute(call.arguments, &self.ctx).await {
                Ok(output) => {
                    if self.verbose {
                        println!("-> {}", output.output);
                    }
                    messages.push(Message::tool_result(&call.id, &call.name, output.output));
                }
                Err(err) => {
                    debug!(name = %call.name, error = %err, "tool returned an error");
                    if self.verbose {
                        println!("-> Error: {err}");
                    }
                    messages.push(Message::tool_error(
                        &call.id,
                        &call.name,
                        format!("Error: {err}"),
                    ));
                }
            }
        }

        Ok(())
    }
}
