//! Read tool - file contents with a length cap.

use crate::{Tool, ToolContext, ToolError, ToolOutput, ToolResult};
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

/// Maximum number of bytes returned before truncation.
const MAX_READ_BYTES: usize = 10_000;

/// Read a file from the working directory.
pub struct ReadFileTool;

#[async_trait]
impl Tool for ReadFileTool {
    fn id(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Reads and returns the first 10000 characters of the content from a specified file within the working directory."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "The path to the file whose content should be read, relative to the working directory."
                }
            },
            "required": ["file_path"]
        })
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> ToolResult<ToolOutput> {
        let file_path = args["file_path"]
            .as_str()
            .ok_or_else(|| ToolError::validation("file_path parameter is required"))?;

        let path = ctx.resolve(file_path).ok_or_else(|| {
            ToolError::permission_denied(format!(
                "Cannot read \"{file_path}\" as it is outside the permitted working directory"
            ))
        })?;

        if !path.is_file() {
            return Err(ToolError::file_not_found(format!(
                "\"{file_path}\" does not exist or is not a regular file"
            )));
        }

        debug!(path = %path.display(), "reading file");

        let content = tokio::fs::read_to_string(&path).await?;

        let truncated = content.len() > MAX_READ_BYTES;
        let output = if truncated {
            // Back off to a char boundary so the slice stays valid UTF-8
            let mut end = MAX_READ_BYTES;
            while !content.is_char_boundary(end) {
                end -= 1;
            }
            format!(
                "{}[...File \"{file_path}\" truncated at {MAX_READ_BYTES} characters]",
                &content[..end]
            )
        } else {
            content
        };

        Ok(ToolOutput::new(file_path, output).with_metadata(json!({
            "truncated": truncated
        })))
    }
}
