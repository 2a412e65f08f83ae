//! Write tool - create or overwrite files in the working directory.

use crate::{Tool, ToolContext, ToolError, ToolOutput, ToolResult};
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

/// Write content to a file inside the working directory.
pub struct WriteFileTool;

#[async_trait]
impl Tool for WriteFileTool {
    fn id(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Writes content to a file within the working directory, creating it if needed and overwriting it otherwise."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path to the file to write, relative to the working directory."
                },
                "content": {
                    "type": "string",
                    "description": "The content to write to the file."
                }
            },
            "required": ["file_path", "content"]
        })
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> ToolResult<ToolOutput> {
        let file_path = args["file_path"]
            .as_str()
            .ok_or_else(|| ToolError::validation("file_path parameter is required"))?;
        let content = args["content"]
            .as_str()
            .ok_or_else(|| ToolError::validation("content parameter is required"))?;

        let path = ctx.resolve(file_path).ok_or_else(|| {
            ToolError::permission_denied(format!(
                "Cannot write to \"{file_path}\" as it is outside the permitted working directory"
            ))
        })?;

        if path.is_dir() {
            return Err(ToolError::validation(format!(
                "\"{file_path}\" is a directory, not a file"
            )));
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        debug!(path = %path.display(), bytes = content.len(), "writing file");

        tokio::fs::write(&path, content).await?;

        let chars = content.chars().count();
        Ok(ToolOutput::new(
            file_path,
            format!("Successfully wrote to \"{file_path}\" ({chars} characters written)"),
        )
        .with_metadata(json!({
            "characters": chars
        })))
    }
}
