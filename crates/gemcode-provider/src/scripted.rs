//! Scripted provider for tests.
//!
//! Returns a fixed sequence of completions and records every request it
//! receives, so agent behavior can be tested without a network.

use crate::{
    error::ProviderError, message::Message, Completion, GenerateOptions, LanguageModel,
    ProviderResult,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Provider that replays a pre-built sequence of completions.
pub struct ScriptedProvider {
    completions: Mutex<VecDeque<ProviderResult<Completion>>>,
    requests: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedProvider {
    /// Create a provider that yields the given completions in order.
    pub fn new(completions: Vec<Completion>) -> Self {
        Self {
            completions: Mutex::new(completions.into_iter().map(Ok).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a provider from explicit results, errors included.
    pub fn from_results(results: Vec<ProviderResult<Completion>>) -> Self {
        Self {
            completions: Mutex::new(results.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Message histories received so far, one entry per generate call.
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of generate calls received.
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LanguageModel for ScriptedProvider {
    async fn generate(
        &self,
        messages: Vec<Message>,
        _options: GenerateOptions,
    ) -> ProviderResult<Completion> {
        self.requests.lock().unwrap().push(messages);
        self.completions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(ProviderError::internal(
                    "scripted provider ran out of completions",
                ))
            })
    }

    fn model_id(&self) -> &str {
        "scripted"
    }

    fn provider_id(&self) -> &str {
        "scripted"
    }
}
