//! List tool - flat directory listing with sizes.

use crate::{Tool, ToolContext, ToolError, ToolOutput, ToolResult};
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

/// List the entries of a directory inside the working directory.
pub struct ListFilesTool;

#[async_trait]
impl Tool for ListFilesTool {
    fn id(&self) -> &str {
        "list_files"
    }

    fn description(&self) -> &str {
        "Lists files in the specified directory along with their sizes, constrained to the working directory."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "directory": {
                    "type": "string",
                    "description": "The directory to list files from, relative to the working directory. If not provided, lists files in the working directory itself."
                }
            }
        })
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> ToolResult<ToolOutput> {
        let directory = args["directory"].as_str().unwrap_or(".");

        let path = ctx.resolve(directory).ok_or_else(|| {
            ToolError::permission_denied(format!(
                "Cannot list \"{directory}\" as it is outside the permitted working directory"
            ))
        })?;

        if !path.is_dir() {
            return Err(ToolError::validation(format!(
                "\"{directory}\" is not a directory"
            )));
        }

        debug!(path = %path.display(), "listing directory");

        let mut entries = Vec::new();
        let mut reader = tokio::fs::read_dir(&path).await?;
        while let Some(entry) = reader.next_entry().await? {
            let metadata = entry.metadata().await?;
            entries.push((
                entry.file_name().to_string_lossy().to_string(),
                metadata.len(),
                metadata.is_dir(),
            ));
        }

        // Directory iteration order is platform-dependent; sort for stable output
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let count = entries.len();
        let output = entries
            .iter()
            .map(|(name, size, is_dir)| {
                format!("- {name}: file_size={size} bytes, is_dir={is_dir}")
            })
            .collect::<Vec<_>>()
            .join("\n");

        let title = if directory == "." {
            "working directory".to_string()
        } else {
            format!("directory \"{directory}\"")
        };

        Ok(ToolOutput::new(title, output).with_metadata(json!({
            "count": count,
            "directory": directory
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_list_working_directory() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("main.py"), "print('hi')").unwrap();
        fs::create_dir(dir.path().join("pkg")).unwrap();

        let tool = ListFilesTool;
        let ctx = ToolContext::new(dir.path());
        let result = tool.execute(json!({}), &ctx).await.unwrap();

        assert!(result
            .output
            .contains("- main.py: file_size=11 bytes, is_dir=false"));
        assert!(result.output.contains("- pkg:"));
        assert!(result.output.contains("is_dir=true"));
        assert_eq!(result.metadata["count"], 2);
    }

    #[tokio::test]
    async fn test_list_sorted_by_name() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("zebra.txt"), "z").unwrap();
        fs::write(dir.path().join("alpha.txt"), "a").unwrap();
        fs::write(dir.path().join("mango.txt"), "m").unwrap();

        let tool = ListFilesTool;
        let ctx = ToolContext::new(dir.path());
        let result = tool.execute(json!({}), &ctx).await.unwrap();

        let lines: Vec<&str> = result.output.lines().collect();
        assert!(lines[0].starts_with("- alpha.txt"));
        assert!(lines[1].starts_with("- mango.txt"));
        assert!(lines[2].starts_with("- zebra.txt"));
    }

    #[tokio::test]
    async fn test_list_subdirectory() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("pkg")).unwrap();
        fs::write(dir.path().join("pkg/module.py"), "x = 1").unwrap();

        let tool = ListFilesTool;
        let ctx = ToolContext::new(dir.path());
        let result = tool
            .execute(json!({"directory": "pkg"}), &ctx)
            .await
            .unwrap();

        assert!(result.output.contains("module.py"));
        assert_eq!(result.metadata["count"], 1);
    }

    #[tokio::test]
    async fn test_list_empty_directory() {
        let dir = tempdir().unwrap();

        let tool = ListFilesTool;
        let ctx = ToolContext::new(dir.path());
        let result = tool.execute(json!({}), &ctx).await.unwrap();

        assert_eq!(result.output, "");
        assert_eq!(result.metadata["count"], 0);
    }

    #[tokio::test]
    async fn test_list_outside_root() {
        let dir = tempdir().unwrap();

        let tool = ListFilesTool;
        let ctx = ToolContext::new(dir.path());
        let err = tool
            .execute(json!({"directory": "../"}), &ctx)
            .await
            .unwrap_err();

        assert!(matches!(err, ToolError::PermissionDenied(_)));
        assert!(err.to_string().contains("outside the permitted working directory"));
    }

    #[tokio::test]
    async fn test_list_not_a_directory() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("main.py"), "").unwrap();

        let tool = ListFilesTool;
        let ctx = ToolContext::new(dir.path());
        let err = tool
            .execute(json!({"directory": "main.py"}), &ctx)
            .await
            .unwrap_err();

        assert!(matches!(err, ToolError::Validation(_)));
        assert!(err.to_string().contains("is not a directory"));
    }
}
