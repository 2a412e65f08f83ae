//! Tool implementations for gemcode.
//!
//! This crate provides the tools the agent can call to inspect and modify
//! files inside its working directory, and to run Python scripts there.
//! Every path argument is resolved against the working directory and
//! rejected if it escapes it.

pub mod error;
pub mod registry;

// Tool implementations
pub mod list;
pub mod read;
pub mod run;
pub mod write;

pub use error::{ToolError, ToolResult};
pub use registry::ToolRegistry;

use async_trait::async_trait;
use gemcode_util::safe_join;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Context provided to tools during execution.
pub struct ToolContext {
    /// The directory tools are confined to.
    pub root_dir: PathBuf,
    /// Cancellation token.
    pub abort: CancellationToken,
}

impl ToolContext {
    /// Create a context rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            abort: CancellationToken::new(),
        }
    }

    /// Resolve a relative path against the working directory.
    ///
    /// Returns `None` if the resolved path would land outside it.
    pub fn resolve(&self, relative: &str) -> Option<PathBuf> {
        safe_join(&self.root_dir, Path::new(relative))
    }
}

/// Result of tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Title/summary of the operation.
    pub title: String,
    /// Output text.
    pub output: String,
    /// Tool-specific metadata.
    pub metadata: Value,
}

impl ToolOutput {
    /// Create a new tool output.
    pub fn new(title: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            output: output.into(),
            metadata: Value::Null,
        }
    }

    /// Add metadata to the output.
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// The main trait for tools.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool ID.
    fn id(&self) -> &str;

    /// Get the tool description (for the model).
    fn description(&self) -> &str;

    /// Get the JSON Schema for the tool's parameters.
    fn parameters_schema(&self) -> Value;

    /// Execute the tool.
    async fn execute(&self, args: Value, ctx: &ToolContext) -> ToolResult<ToolOutput>;
}

/// A boxed tool for dynamic dispatch.
pub type BoxedTool = Arc<dyn Tool>;
